//! In-process implementation of the storage traits.
//!
//! All state sits behind one async mutex. A unit of work holds the lock for
//! its whole lifetime and mutates a staged copy, which replaces the live
//! state on commit; dropping it uncommitted leaves the live state untouched.
//! Writers are therefore serialized, readers wait for the current writer.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    AssetStore, AssetUnitOfWork, AuditLog, ServiceDirectory, Store, StoreError, StoreResult,
};
use crate::assets::filter::{compare_assets, AssetFilter, Page, PageRequest};
use crate::assets::stats::sum_values;
use crate::assets::{Asset, AssetRecord, AssetStatus, AssetView};
use crate::audit::{sort_newest_first, AuditEntry, NewAuditEntry};
use crate::services::{CreateService, Service, UpdateService};
use crate::types::DbId;

#[derive(Debug, Default, Clone)]
struct MemoryState {
    assets: BTreeMap<DbId, Asset>,
    audit: Vec<AuditEntry>,
    services: BTreeMap<DbId, Service>,
    last_asset_id: DbId,
    last_audit_id: DbId,
    last_service_id: DbId,
}

impl MemoryState {
    fn view(&self, asset: &Asset) -> AssetView {
        let service_name = asset
            .data
            .service_id
            .and_then(|id| self.services.get(&id))
            .map(|s| s.name.clone());
        AssetView {
            asset: asset.clone(),
            service_name,
        }
    }

    fn matching(&self, filter: &AssetFilter) -> Vec<&Asset> {
        self.assets.values().filter(|a| filter.matches(a)).collect()
    }

    fn get_many(&self, ids: &[DbId]) -> Vec<AssetView> {
        let wanted: BTreeSet<DbId> = ids.iter().copied().collect();
        wanted
            .into_iter()
            .filter_map(|id| self.assets.get(&id))
            .map(|a| self.view(a))
            .collect()
    }
}

fn next_id(counter: &mut DbId) -> DbId {
    *counter += 1;
    *counter
}

/// Storage backend kept entirely in memory. Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn list(&self, filter: &AssetFilter) -> StoreResult<Vec<AssetView>> {
        let state = self.state.lock().await;
        Ok(state
            .matching(filter)
            .into_iter()
            .map(|a| state.view(a))
            .collect())
    }

    async fn page(
        &self,
        request: &PageRequest,
        filter: &AssetFilter,
    ) -> StoreResult<Page<AssetView>> {
        let state = self.state.lock().await;
        let mut matching = state.matching(filter);
        matching.sort_by(|a, b| compare_assets(a, b, request.sort, request.direction));

        let total = matching.len() as i64;
        let content = matching
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.size).unwrap_or(0))
            .map(|a| state.view(a))
            .collect();
        Ok(Page::new(content, total, request))
    }

    async fn get(&self, id: DbId) -> StoreResult<Option<AssetView>> {
        let state = self.state.lock().await;
        Ok(state.assets.get(&id).map(|a| state.view(a)))
    }

    async fn get_many(&self, ids: &[DbId]) -> StoreResult<Vec<AssetView>> {
        Ok(self.state.lock().await.get_many(ids))
    }

    async fn all(&self) -> StoreResult<Vec<AssetView>> {
        let state = self.state.lock().await;
        Ok(state.assets.values().map(|a| state.view(a)).collect())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.state.lock().await.assets.len() as i64)
    }

    async fn count_by_status(&self, status: AssetStatus) -> StoreResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .assets
            .values()
            .filter(|a| a.data.status == status)
            .count() as i64)
    }

    async fn total_value(&self) -> StoreResult<Decimal> {
        let state = self.state.lock().await;
        sum_values(state.assets.values().map(|a| a.data.value))
            .ok_or(StoreError::Overflow("total asset value"))
    }

    async fn begin(&self) -> StoreResult<Box<dyn AssetUnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, staged }))
    }
}

/// Staged writes over a locked snapshot.
struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl AssetUnitOfWork for MemoryUnitOfWork {
    async fn get(&mut self, id: DbId) -> StoreResult<Option<AssetView>> {
        Ok(self.staged.assets.get(&id).map(|a| self.staged.view(a)))
    }

    async fn get_many(&mut self, ids: &[DbId]) -> StoreResult<Vec<AssetView>> {
        Ok(self.staged.get_many(ids))
    }

    async fn find_service(&mut self, id: DbId) -> StoreResult<Option<Service>> {
        Ok(self.staged.services.get(&id).cloned())
    }

    async fn upsert(&mut self, record: AssetRecord) -> StoreResult<AssetView> {
        let id = match record.id {
            Some(id) if self.staged.assets.contains_key(&id) => id,
            Some(id) => return Err(StoreError::Vanished { entity: "Asset", id }),
            None => next_id(&mut self.staged.last_asset_id),
        };
        let asset = Asset {
            id,
            data: record.data,
        };
        let view = self.staged.view(&asset);
        self.staged.assets.insert(id, asset);
        Ok(view)
    }

    async fn delete(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.staged.assets.remove(&id).is_some())
    }

    async fn delete_many(&mut self, ids: &[DbId]) -> StoreResult<Vec<DbId>> {
        let wanted: BTreeSet<DbId> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter(|id| self.staged.assets.remove(id).is_some())
            .collect())
    }

    async fn append_audit(&mut self, entry: NewAuditEntry) -> StoreResult<AuditEntry> {
        let stored = AuditEntry {
            id: next_id(&mut self.staged.last_audit_id),
            asset_id: entry.asset_id,
            action: entry.action,
            detail: entry.detail,
            timestamp: entry.timestamp,
            actor: entry.actor,
        };
        self.staged.audit.push(stored.clone());
        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn history_for(&self, asset_id: DbId) -> StoreResult<Vec<AuditEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<AuditEntry> = state
            .audit
            .iter()
            .filter(|e| e.asset_id == asset_id)
            .cloned()
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries)
    }
}

#[async_trait]
impl ServiceDirectory for MemoryStore {
    async fn list_services(&self, active_only: bool) -> StoreResult<Vec<Service>> {
        let state = self.state.lock().await;
        Ok(state
            .services
            .values()
            .filter(|s| !active_only || s.active)
            .cloned()
            .collect())
    }

    async fn page_services(&self, request: &PageRequest) -> StoreResult<Page<Service>> {
        let state = self.state.lock().await;
        let total = state.services.len() as i64;
        let content = state
            .services
            .values()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.size).unwrap_or(0))
            .cloned()
            .collect();
        Ok(Page::new(content, total, request))
    }

    async fn get_service(&self, id: DbId) -> StoreResult<Option<Service>> {
        Ok(self.state.lock().await.services.get(&id).cloned())
    }

    async fn create_service(&self, input: &CreateService) -> StoreResult<Service> {
        let mut state = self.state.lock().await;
        let service = Service {
            id: next_id(&mut state.last_service_id),
            name: input.name.clone(),
            description: input.description.clone(),
            code: input.code.clone(),
            responsible: input.responsible.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            active: input.active.unwrap_or(true),
        };
        state.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn update_service(
        &self,
        id: DbId,
        changes: &UpdateService,
    ) -> StoreResult<Option<Service>> {
        let mut state = self.state.lock().await;
        Ok(state.services.get_mut(&id).map(|service| {
            service.merge(changes);
            service.clone()
        }))
    }

    async fn delete_service(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.state.lock().await.services.remove(&id).is_some())
    }

    async fn search_services(&self, q: &str) -> StoreResult<Vec<Service>> {
        let needle = q.to_lowercase();
        let state = self.state.lock().await;
        Ok(state
            .services
            .values()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::assets::AssetData;
    use crate::audit::{details, AuditAction};

    fn data(name: &str) -> AssetData {
        AssetData {
            name: name.into(),
            reference: None,
            description: None,
            category: None,
            status: AssetStatus::InService,
            acquisition_date: None,
            value: None,
            serial_number: None,
            location: None,
            service_id: None,
            created_at: Utc::now(),
            updated_at: None,
            created_by: "system".into(),
            modified_by: None,
        }
    }

    async fn insert(store: &MemoryStore, name: &str) -> AssetView {
        let mut uow = store.begin().await.unwrap();
        let view = uow
            .upsert(AssetRecord {
                id: None,
                data: data(name),
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();
        view
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_not_reused() {
        let store = MemoryStore::new();
        let a = insert(&store, "a").await;
        let b = insert(&store, "b").await;

        let mut uow = store.begin().await.unwrap();
        assert!(uow.delete(b.id()).await.unwrap());
        uow.commit().await.unwrap();

        let c = insert(&store, "c").await;
        assert!(a.id() < b.id());
        assert!(c.id() > b.id());
    }

    #[tokio::test]
    async fn uncommitted_work_is_discarded() {
        let store = MemoryStore::new();
        {
            let mut uow = store.begin().await.unwrap();
            let view = uow
                .upsert(AssetRecord {
                    id: None,
                    data: data("ghost"),
                })
                .await
                .unwrap();
            uow.append_audit(NewAuditEntry::now(
                view.id(),
                AuditAction::Created,
                details::CREATED,
                "alice",
            ))
            .await
            .unwrap();
            // Dropped without commit.
        }

        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.history_for(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replacing_a_missing_row_fails() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let result = uow
            .upsert(AssetRecord {
                id: Some(41),
                data: data("nope"),
            })
            .await;
        assert!(matches!(result, Err(StoreError::Vanished { id: 41, .. })));
    }

    #[tokio::test]
    async fn deleted_service_leaves_orphaned_reference() {
        let store = MemoryStore::new();
        let service = store
            .create_service(&CreateService {
                name: "Logistics".into(),
                description: None,
                code: None,
                responsible: None,
                email: None,
                phone: None,
                active: None,
            })
            .await
            .unwrap();

        let mut uow = store.begin().await.unwrap();
        let mut owned = data("Truck");
        owned.service_id = Some(service.id);
        let view = uow
            .upsert(AssetRecord {
                id: None,
                data: owned,
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();
        assert_eq!(view.service_name.as_deref(), Some("Logistics"));

        assert!(store.delete_service(service.id).await.unwrap());

        let after = store.get(view.id()).await.unwrap().unwrap();
        assert_eq!(after.asset.data.service_id, Some(service.id));
        assert_eq!(after.service_name, None);
    }

    #[tokio::test]
    async fn get_many_dedupes_and_skips_unknown() {
        let store = MemoryStore::new();
        let a = insert(&store, "a").await;
        let b = insert(&store, "b").await;

        let found = store.get_many(&[b.id(), 999, a.id(), b.id()]).await.unwrap();
        let ids: Vec<_> = found.iter().map(AssetView::id).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
    }

    #[tokio::test]
    async fn delete_many_reports_removed_ids_once() {
        let store = MemoryStore::new();
        let a = insert(&store, "a").await;
        let b = insert(&store, "b").await;
        let keep = insert(&store, "c").await;

        let mut uow = store.begin().await.unwrap();
        let removed = uow
            .delete_many(&[b.id(), 404, a.id(), b.id()])
            .await
            .unwrap();
        uow.commit().await.unwrap();

        assert_eq!(removed, vec![a.id(), b.id()]);
        let left: Vec<_> = store.all().await.unwrap().iter().map(AssetView::id).collect();
        assert_eq!(left, vec![keep.id()]);
    }

    #[tokio::test]
    async fn total_value_overflow_is_an_error() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        for name in ["a", "b"] {
            let mut rich = data(name);
            rich.value = Some(Decimal::MAX);
            uow.upsert(AssetRecord { id: None, data: rich }).await.unwrap();
        }
        uow.commit().await.unwrap();

        assert!(matches!(
            store.total_value().await,
            Err(StoreError::Overflow(_))
        ));
    }
}
