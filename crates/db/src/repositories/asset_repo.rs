//! Repository for the `assets` table.

use gactif_core::assets::filter::{AssetFilter, PageRequest, SortField};
use gactif_core::assets::{AssetData, AssetStatus};
use gactif_core::types::DbId;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::contains_pattern;
use crate::models::asset::AssetRow;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Select list for the asset view (asset columns plus the service name).
const COLUMNS: &str = "\
    a.id, a.name, a.reference, a.description, a.category, a.status, \
    a.acquisition_date, a.value, a.serial_number, a.location, a.service_id, \
    a.created_at, a.updated_at, a.created_by, a.modified_by, \
    s.name AS service_name";

/// Assets joined with their (possibly missing) service.
const FROM: &str = "assets a LEFT JOIN services s ON s.id = a.service_id";

/// Writable columns, in bind order.
const WRITE_COLUMNS: &str = "\
    name, reference, description, category, status, acquisition_date, value, \
    serial_number, location, service_id, created_at, updated_at, created_by, \
    modified_by";

// ---------------------------------------------------------------------------
// AssetRepo
// ---------------------------------------------------------------------------

/// Provides query and write operations for assets.
pub struct AssetRepo;

impl AssetRepo {
    /// All assets matching `filter`, id ascending.
    pub async fn list(pool: &PgPool, filter: &AssetFilter) -> Result<Vec<AssetRow>, sqlx::Error> {
        let (where_clause, bind_values, _) = build_asset_filter(filter);
        let query = format!("SELECT {COLUMNS} FROM {FROM} {where_clause} ORDER BY a.id ASC");

        bind_asset_values(sqlx::query_as::<_, AssetRow>(&query), &bind_values)
            .fetch_all(pool)
            .await
    }

    /// One page of assets matching `filter`, ordered per `request`.
    pub async fn page(
        pool: &PgPool,
        request: &PageRequest,
        filter: &AssetFilter,
    ) -> Result<Vec<AssetRow>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_asset_filter(filter);
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM} {where_clause} \
             ORDER BY {} {}, a.id ASC \
             LIMIT ${bind_idx} OFFSET ${}",
            sort_column(request.sort),
            request.direction.as_sql(),
            bind_idx + 1
        );

        bind_asset_values(sqlx::query_as::<_, AssetRow>(&query), &bind_values)
            .bind(request.size)
            .bind(request.offset())
            .fetch_all(pool)
            .await
    }

    /// Count assets matching `filter` (for page metadata).
    pub async fn count_matching(pool: &PgPool, filter: &AssetFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_asset_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM assets a {where_clause}");

        bind_asset_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE a.id = $1");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Existing assets among `ids`, id ascending. Duplicates collapse.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE a.id = ANY($1) ORDER BY a.id ASC");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM assets")
            .fetch_one(pool)
            .await
    }

    pub async fn count_by_status(pool: &PgPool, status: AssetStatus) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM assets WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Exact sum of all values; `NULL` values contribute nothing.
    pub async fn total_value(pool: &PgPool) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(value), 0) FROM assets")
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Transactional operations
    // -----------------------------------------------------------------------

    /// Fetch an asset and lock its row until the transaction ends.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE a.id = $1 FOR UPDATE OF a");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Fetch and lock the existing assets among `ids`, id ascending.
    pub async fn lock_many(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<AssetRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM} WHERE a.id = ANY($1) ORDER BY a.id ASC FOR UPDATE OF a"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(ids)
            .fetch_all(conn)
            .await
    }

    /// Insert a new asset, returning its id.
    pub async fn insert(conn: &mut PgConnection, data: &AssetData) -> Result<DbId, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets ({WRITE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING id"
        );
        sqlx::query_scalar::<_, DbId>(&query)
            .bind(&data.name)
            .bind(&data.reference)
            .bind(&data.description)
            .bind(data.category.map(|c| c.as_str()))
            .bind(data.status.as_str())
            .bind(data.acquisition_date)
            .bind(data.value)
            .bind(&data.serial_number)
            .bind(&data.location)
            .bind(data.service_id)
            .bind(data.created_at)
            .bind(data.updated_at)
            .bind(&data.created_by)
            .bind(&data.modified_by)
            .fetch_one(conn)
            .await
    }

    /// Overwrite every stored column of an asset. Returns `false` if no row
    /// with the id exists.
    pub async fn replace(
        conn: &mut PgConnection,
        id: DbId,
        data: &AssetData,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE assets SET
                name = $2,
                reference = $3,
                description = $4,
                category = $5,
                status = $6,
                acquisition_date = $7,
                value = $8,
                serial_number = $9,
                location = $10,
                service_id = $11,
                created_at = $12,
                updated_at = $13,
                created_by = $14,
                modified_by = $15
             WHERE id = $1",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.reference)
        .bind(&data.description)
        .bind(data.category.map(|c| c.as_str()))
        .bind(data.status.as_str())
        .bind(data.acquisition_date)
        .bind(data.value)
        .bind(&data.serial_number)
        .bind(&data.location)
        .bind(data.service_id)
        .bind(data.created_at)
        .bind(data.updated_at)
        .bind(&data.created_by)
        .bind(&data.modified_by)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Read an asset through an open transaction, without locking.
    pub async fn find_by_id_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE a.id = $1");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Delete an asset by ID. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every asset among `ids` in one statement. Returns the removed
    /// ids, ascending.
    pub async fn delete_many(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut removed =
            sqlx::query_scalar::<_, DbId>("DELETE FROM assets WHERE id = ANY($1) RETURNING id")
                .bind(ids)
                .fetch_all(conn)
                .await?;
        removed.sort_unstable();
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Filter and sort helpers
// ---------------------------------------------------------------------------

/// Intermediate representation for dynamically-bound values.
enum BindValue {
    BigInt(i64),
    Text(String),
}

/// Build a WHERE clause from the filter. Returns (clause, values, next bind index).
fn build_asset_filter(filter: &AssetFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(service_id) = filter.service_id {
        conditions.push(format!("a.service_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(service_id));
    }

    if let Some(status) = filter.status {
        conditions.push(format!("a.status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(status.as_str().to_string()));
    }

    if let Some(ref search) = filter.search {
        conditions.push(format!(
            "(a.name ILIKE ${bind_idx} OR a.reference ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(BindValue::Text(contains_pattern(search)));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// ORDER BY expression for a sort field. Text columns compare bytewise.
fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Id => "a.id",
        SortField::Name => "a.name COLLATE \"C\"",
        SortField::Reference => "a.reference COLLATE \"C\"",
        SortField::Category => "a.category COLLATE \"C\"",
        SortField::Status => "a.status COLLATE \"C\"",
        SortField::AcquisitionDate => "a.acquisition_date",
        SortField::Value => "a.value",
        SortField::SerialNumber => "a.serial_number COLLATE \"C\"",
        SortField::Location => "a.location COLLATE \"C\"",
        SortField::CreatedAt => "a.created_at",
        SortField::UpdatedAt => "a.updated_at",
    }
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_asset_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_asset_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
        }
    }
    q
}
