//! Service directory rows.

use gactif_core::services::Service;
use gactif_core::types::DbId;
use sqlx::FromRow;

/// A row from the `services` table.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub code: Option<String>,
    pub responsible: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: row.id,
            name: row.name,
            description: row.description,
            code: row.code,
            responsible: row.responsible,
            email: row.email,
            phone: row.phone,
            active: row.active,
        }
    }
}
