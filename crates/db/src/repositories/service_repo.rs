//! Repository for the `services` table.

use gactif_core::services::{CreateService, UpdateService};
use gactif_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use super::contains_pattern;
use crate::models::service::ServiceRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, code, responsible, email, phone, active";

/// Provides CRUD operations for services.
pub struct ServiceRepo;

impl ServiceRepo {
    /// Insert a new service. `active` defaults to true.
    pub async fn create(pool: &PgPool, input: &CreateService) -> Result<ServiceRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO services (name, description, code, responsible, email, phone, active)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.code)
            .bind(&input.responsible)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ServiceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services WHERE id = $1");
        sqlx::query_as::<_, ServiceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up a service through an open transaction.
    pub async fn find_by_id_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ServiceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services WHERE id = $1");
        sqlx::query_as::<_, ServiceRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List services ordered by id, optionally only active ones.
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<ServiceRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM services WHERE ($1 = FALSE OR active) ORDER BY id ASC"
        );
        sqlx::query_as::<_, ServiceRow>(&query)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn list_page(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ServiceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services ORDER BY id ASC LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, ServiceRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM services")
            .fetch_one(pool)
            .await
    }

    /// Update a service. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateService,
    ) -> Result<Option<ServiceRow>, sqlx::Error> {
        let query = format!(
            "UPDATE services SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                code = COALESCE($4, code),
                responsible = COALESCE($5, responsible),
                email = COALESCE($6, email),
                phone = COALESCE($7, phone),
                active = COALESCE($8, active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.code)
            .bind(&input.responsible)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a service by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Case-insensitive substring search over the name, ordered by id.
    pub async fn search(pool: &PgPool, q: &str) -> Result<Vec<ServiceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services WHERE name ILIKE $1 ORDER BY id ASC");
        sqlx::query_as::<_, ServiceRow>(&query)
            .bind(contains_pattern(q))
            .fetch_all(pool)
            .await
    }
}
