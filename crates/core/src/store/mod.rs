//! Storage seam between the domain layer and persistence.
//!
//! Reads go straight through [`AssetStore`], [`AuditLog`] and
//! [`ServiceDirectory`]. Every asset mutation goes through an
//! [`AssetUnitOfWork`] obtained from [`AssetStore::begin`], which also
//! carries the audit append, so a mutation and its audit entries commit or
//! roll back together. Dropping a unit of work without calling
//! [`AssetUnitOfWork::commit`] discards everything it staged.

pub mod memory;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::assets::filter::{AssetFilter, Page, PageRequest};
use crate::assets::{AssetRecord, AssetStatus, AssetView};
use crate::audit::{AuditEntry, NewAuditEntry};
use crate::services::{CreateService, Service, UpdateService};
use crate::types::DbId;

/// Failure inside a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A stored value could not be mapped back to a domain type.
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),

    /// A row expected to exist was gone when it was written.
    #[error("{entity} with id {id} vanished during write")]
    Vanished { entity: &'static str, id: DbId },

    /// An aggregate left the range of its numeric type.
    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to assets plus the entry point for mutations.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// All assets matching `filter`, no implicit limit.
    async fn list(&self, filter: &AssetFilter) -> StoreResult<Vec<AssetView>>;

    /// One page of assets matching `filter`.
    async fn page(&self, request: &PageRequest, filter: &AssetFilter)
        -> StoreResult<Page<AssetView>>;

    /// A single asset, or `None` when absent.
    async fn get(&self, id: DbId) -> StoreResult<Option<AssetView>>;

    /// Assets with the given ids, id ascending. Unknown ids are skipped.
    async fn get_many(&self, ids: &[DbId]) -> StoreResult<Vec<AssetView>>;

    /// Every asset, id ascending.
    async fn all(&self) -> StoreResult<Vec<AssetView>>;

    async fn count(&self) -> StoreResult<i64>;

    async fn count_by_status(&self, status: AssetStatus) -> StoreResult<i64>;

    /// Exact sum of all values, absent values counting as zero.
    async fn total_value(&self) -> StoreResult<Decimal>;

    /// Unpaged list of one service's assets.
    async fn find_by_service(&self, service_id: DbId) -> StoreResult<Vec<AssetView>> {
        self.list(&AssetFilter::service(service_id)).await
    }

    /// Case-insensitive substring match over name or reference.
    async fn search_text(&self, q: &str) -> StoreResult<Vec<AssetView>> {
        self.list(&AssetFilter::text(q)).await
    }

    /// Open a unit of work for a mutation.
    async fn begin(&self) -> StoreResult<Box<dyn AssetUnitOfWork>>;
}

/// A batch of asset writes and audit appends that commit atomically.
#[async_trait]
pub trait AssetUnitOfWork: Send {
    async fn get(&mut self, id: DbId) -> StoreResult<Option<AssetView>>;

    /// Existing assets among `ids`, id ascending, each at most once.
    async fn get_many(&mut self, ids: &[DbId]) -> StoreResult<Vec<AssetView>>;

    async fn find_service(&mut self, id: DbId) -> StoreResult<Option<Service>>;

    /// Insert when `record.id` is unset, otherwise replace the whole row.
    async fn upsert(&mut self, record: AssetRecord) -> StoreResult<AssetView>;

    /// Remove an asset. Returns `false` if it did not exist.
    async fn delete(&mut self, id: DbId) -> StoreResult<bool>;

    /// Remove every existing asset among `ids`. Returns the removed ids,
    /// ascending, each at most once.
    async fn delete_many(&mut self, ids: &[DbId]) -> StoreResult<Vec<DbId>>;

    /// Append one audit entry.
    async fn append_audit(&mut self, entry: NewAuditEntry) -> StoreResult<AuditEntry>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Append-only audit trail, read side.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Entries for `asset_id`, newest first. Never fails for unknown ids.
    async fn history_for(&self, asset_id: DbId) -> StoreResult<Vec<AuditEntry>>;
}

/// Organizational units.
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// All services, or only active ones, id ascending.
    async fn list_services(&self, active_only: bool) -> StoreResult<Vec<Service>>;

    async fn page_services(&self, request: &PageRequest) -> StoreResult<Page<Service>>;

    async fn get_service(&self, id: DbId) -> StoreResult<Option<Service>>;

    async fn create_service(&self, input: &CreateService) -> StoreResult<Service>;

    /// Merge `changes` into the service. `None` when it does not exist.
    async fn update_service(&self, id: DbId, changes: &UpdateService)
        -> StoreResult<Option<Service>>;

    /// Remove a service. Assets referring to it are left untouched.
    async fn delete_service(&self, id: DbId) -> StoreResult<bool>;

    /// Case-insensitive substring match over the name.
    async fn search_services(&self, q: &str) -> StoreResult<Vec<Service>>;
}

/// Everything a backend provides.
pub trait Store: AssetStore + AuditLog + ServiceDirectory {
    /// Short backend name for health reporting.
    fn backend_name(&self) -> &'static str;
}
