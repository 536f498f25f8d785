use crate::store::StoreError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Shorthand for the common "asset with id N does not exist" case.
    pub fn asset_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "Asset",
            id,
        }
    }
}
