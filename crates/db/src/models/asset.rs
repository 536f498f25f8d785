//! Asset rows.

use gactif_core::assets::{Asset, AssetCategory, AssetData, AssetStatus, AssetView};
use gactif_core::store::StoreError;
use gactif_core::types::{Date, DbId, Timestamp};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// A row from `assets` joined with the owning service's name.
#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    pub id: DbId,
    pub name: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub acquisition_date: Option<Date>,
    pub value: Option<Decimal>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub service_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
    pub created_by: String,
    pub modified_by: Option<String>,
    /// `NULL` when unassigned or when the service row is gone.
    pub service_name: Option<String>,
}

impl TryFrom<AssetRow> for AssetView {
    type Error = StoreError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        let status = AssetStatus::parse(&row.status)
            .map_err(|_| StoreError::Corrupt(format!("asset {} has status '{}'", row.id, row.status)))?;
        let category = row
            .category
            .as_deref()
            .map(AssetCategory::parse)
            .transpose()
            .map_err(|e| StoreError::Corrupt(format!("asset {}: {e}", row.id)))?;

        Ok(AssetView {
            asset: Asset {
                id: row.id,
                data: AssetData {
                    name: row.name,
                    reference: row.reference,
                    description: row.description,
                    category,
                    status,
                    acquisition_date: row.acquisition_date,
                    value: row.value,
                    serial_number: row.serial_number,
                    location: row.location,
                    service_id: row.service_id,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    created_by: row.created_by,
                    modified_by: row.modified_by,
                },
            },
            service_name: row.service_name,
        })
    }
}

/// Convert a batch of rows, failing on the first corrupt one.
pub fn into_views(rows: Vec<AssetRow>) -> Result<Vec<AssetView>, StoreError> {
    rows.into_iter().map(AssetView::try_from).collect()
}
