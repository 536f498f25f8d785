//! PostgreSQL implementation of the core storage traits.
//!
//! A unit of work is one SQL transaction. Rows read through it are locked
//! with `FOR UPDATE`, so concurrent writers to the same asset serialize and
//! the mutation commits together with its audit entries.

use async_trait::async_trait;
use gactif_core::assets::filter::{AssetFilter, Page, PageRequest};
use gactif_core::assets::{AssetRecord, AssetStatus, AssetView};
use gactif_core::audit::{AuditEntry, NewAuditEntry};
use gactif_core::services::{CreateService, Service, UpdateService};
use gactif_core::store::{
    AssetStore, AssetUnitOfWork, AuditLog, ServiceDirectory, Store, StoreError, StoreResult,
};
use gactif_core::types::DbId;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use crate::models::asset::into_views;
use crate::repositories::{AssetRepo, AuditRepo, ServiceRepo};
use crate::DbPool;

/// Storage backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl AssetStore for PgStore {
    async fn list(&self, filter: &AssetFilter) -> StoreResult<Vec<AssetView>> {
        let rows = AssetRepo::list(&self.pool, filter)
            .await
            .map_err(StoreError::backend)?;
        into_views(rows)
    }

    async fn page(
        &self,
        request: &PageRequest,
        filter: &AssetFilter,
    ) -> StoreResult<Page<AssetView>> {
        let total = AssetRepo::count_matching(&self.pool, filter)
            .await
            .map_err(StoreError::backend)?;
        let rows = AssetRepo::page(&self.pool, request, filter)
            .await
            .map_err(StoreError::backend)?;
        Ok(Page::new(into_views(rows)?, total, request))
    }

    async fn get(&self, id: DbId) -> StoreResult<Option<AssetView>> {
        AssetRepo::find_by_id(&self.pool, id)
            .await
            .map_err(StoreError::backend)?
            .map(AssetView::try_from)
            .transpose()
    }

    async fn get_many(&self, ids: &[DbId]) -> StoreResult<Vec<AssetView>> {
        let rows = AssetRepo::find_many(&self.pool, ids)
            .await
            .map_err(StoreError::backend)?;
        into_views(rows)
    }

    async fn all(&self) -> StoreResult<Vec<AssetView>> {
        self.list(&AssetFilter::default()).await
    }

    async fn count(&self) -> StoreResult<i64> {
        AssetRepo::count(&self.pool).await.map_err(StoreError::backend)
    }

    async fn count_by_status(&self, status: AssetStatus) -> StoreResult<i64> {
        AssetRepo::count_by_status(&self.pool, status)
            .await
            .map_err(StoreError::backend)
    }

    async fn total_value(&self) -> StoreResult<Decimal> {
        AssetRepo::total_value(&self.pool)
            .await
            .map_err(StoreError::backend)
    }

    async fn begin(&self) -> StoreResult<Box<dyn AssetUnitOfWork>> {
        let tx = self.pool.begin().await.map_err(StoreError::backend)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// An open transaction. Dropping it without commit rolls back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AssetUnitOfWork for PgUnitOfWork {
    async fn get(&mut self, id: DbId) -> StoreResult<Option<AssetView>> {
        AssetRepo::lock_by_id(&mut self.tx, id)
            .await
            .map_err(StoreError::backend)?
            .map(AssetView::try_from)
            .transpose()
    }

    async fn get_many(&mut self, ids: &[DbId]) -> StoreResult<Vec<AssetView>> {
        let rows = AssetRepo::lock_many(&mut self.tx, ids)
            .await
            .map_err(StoreError::backend)?;
        into_views(rows)
    }

    async fn find_service(&mut self, id: DbId) -> StoreResult<Option<Service>> {
        Ok(ServiceRepo::find_by_id_in(&mut self.tx, id)
            .await
            .map_err(StoreError::backend)?
            .map(Service::from))
    }

    async fn upsert(&mut self, record: AssetRecord) -> StoreResult<AssetView> {
        let id = match record.id {
            None => AssetRepo::insert(&mut self.tx, &record.data)
                .await
                .map_err(StoreError::backend)?,
            Some(id) => {
                let replaced = AssetRepo::replace(&mut self.tx, id, &record.data)
                    .await
                    .map_err(StoreError::backend)?;
                if !replaced {
                    return Err(StoreError::Vanished { entity: "Asset", id });
                }
                id
            }
        };

        AssetRepo::find_by_id_in(&mut self.tx, id)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::Vanished { entity: "Asset", id })
            .and_then(AssetView::try_from)
    }

    async fn delete(&mut self, id: DbId) -> StoreResult<bool> {
        AssetRepo::delete(&mut self.tx, id)
            .await
            .map_err(StoreError::backend)
    }

    async fn delete_many(&mut self, ids: &[DbId]) -> StoreResult<Vec<DbId>> {
        AssetRepo::delete_many(&mut self.tx, ids)
            .await
            .map_err(StoreError::backend)
    }

    async fn append_audit(&mut self, entry: NewAuditEntry) -> StoreResult<AuditEntry> {
        let row = AuditRepo::append(&mut self.tx, &entry)
            .await
            .map_err(StoreError::backend)?;
        AuditEntry::try_from(row)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(StoreError::backend)
    }
}

#[async_trait]
impl AuditLog for PgStore {
    async fn history_for(&self, asset_id: DbId) -> StoreResult<Vec<AuditEntry>> {
        AuditRepo::history_for(&self.pool, asset_id)
            .await
            .map_err(StoreError::backend)?
            .into_iter()
            .map(AuditEntry::try_from)
            .collect()
    }
}

#[async_trait]
impl ServiceDirectory for PgStore {
    async fn list_services(&self, active_only: bool) -> StoreResult<Vec<Service>> {
        let rows = ServiceRepo::list(&self.pool, active_only)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn page_services(&self, request: &PageRequest) -> StoreResult<Page<Service>> {
        let total = ServiceRepo::count(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        let rows = ServiceRepo::list_page(&self.pool, request.size, request.offset())
            .await
            .map_err(StoreError::backend)?;
        Ok(Page::new(rows, total, request).map(Service::from))
    }

    async fn get_service(&self, id: DbId) -> StoreResult<Option<Service>> {
        Ok(ServiceRepo::find_by_id(&self.pool, id)
            .await
            .map_err(StoreError::backend)?
            .map(Service::from))
    }

    async fn create_service(&self, input: &CreateService) -> StoreResult<Service> {
        let row = ServiceRepo::create(&self.pool, input)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.into())
    }

    async fn update_service(
        &self,
        id: DbId,
        changes: &UpdateService,
    ) -> StoreResult<Option<Service>> {
        Ok(ServiceRepo::update(&self.pool, id, changes)
            .await
            .map_err(StoreError::backend)?
            .map(Service::from))
    }

    async fn delete_service(&self, id: DbId) -> StoreResult<bool> {
        ServiceRepo::delete(&self.pool, id)
            .await
            .map_err(StoreError::backend)
    }

    async fn search_services(&self, q: &str) -> StoreResult<Vec<Service>> {
        let rows = ServiceRepo::search(&self.pool, q)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(Service::from).collect())
    }
}

impl Store for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
