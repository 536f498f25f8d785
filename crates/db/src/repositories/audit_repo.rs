//! Repository for the `asset_history` table.
//!
//! Append and read only; rows are never updated or deleted.

use gactif_core::audit::NewAuditEntry;
use gactif_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::audit::AuditRow;

/// Column list for `asset_history` SELECT queries.
const COLUMNS: &str = "id, asset_id, action, detail, timestamp, actor";

pub struct AuditRepo;

impl AuditRepo {
    /// Append one entry inside the caller's transaction.
    pub async fn append(
        conn: &mut PgConnection,
        entry: &NewAuditEntry,
    ) -> Result<AuditRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_history (asset_id, action, detail, timestamp, actor) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditRow>(&query)
            .bind(entry.asset_id)
            .bind(entry.action.as_str())
            .bind(&entry.detail)
            .bind(entry.timestamp)
            .bind(&entry.actor)
            .fetch_one(conn)
            .await
    }

    /// Entries for an asset, most recent first.
    pub async fn history_for(pool: &PgPool, asset_id: DbId) -> Result<Vec<AuditRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_history \
             WHERE asset_id = $1 \
             ORDER BY timestamp DESC, id DESC"
        );
        sqlx::query_as::<_, AuditRow>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }
}
