//! Audit trail rows (`asset_history`).

use gactif_core::audit::{AuditAction, AuditEntry};
use gactif_core::store::StoreError;
use gactif_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AuditRow {
    pub id: DbId,
    pub asset_id: DbId,
    pub action: String,
    pub detail: String,
    pub timestamp: Timestamp,
    pub actor: String,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = StoreError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action = AuditAction::parse(&row.action)
            .map_err(|_| StoreError::Corrupt(format!("audit entry {} has action '{}'", row.id, row.action)))?;
        Ok(AuditEntry {
            id: row.id,
            asset_id: row.asset_id,
            action,
            detail: row.detail,
            timestamp: row.timestamp,
            actor: row.actor,
        })
    }
}
