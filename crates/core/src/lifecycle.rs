//! Asset Lifecycle Manager.
//!
//! [`AssetLifecycle`] is the only component that mutates assets. Each
//! mutation resolves the service relationship, stamps timestamps and the
//! acting identity, writes the asset and appends its audit entries inside a
//! single unit of work.

use std::sync::Arc;

use chrono::Utc;

use crate::assets::export::render_table;
use crate::assets::filter::{AssetFilter, Page, PageRequest};
use crate::assets::stats::AssetStatistics;
use crate::assets::{AssetRecord, AssetStatus, AssetView, CreateAsset, UpdateAsset};
use crate::audit::{details, status_changed_detail, AuditAction, AuditEntry, NewAuditEntry};
use crate::error::CoreError;
use crate::services::ServiceResolution;
use crate::store::{AssetUnitOfWork, Store};
use crate::types::DbId;

/// Orchestrates asset mutations over a [`Store`].
#[derive(Clone)]
pub struct AssetLifecycle {
    store: Arc<dyn Store>,
    service_resolution: ServiceResolution,
}

impl AssetLifecycle {
    pub fn new(store: Arc<dyn Store>, service_resolution: ServiceResolution) -> Self {
        Self {
            store,
            service_resolution,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn service_resolution(&self) -> ServiceResolution {
        self.service_resolution
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn list(&self, filter: &AssetFilter) -> Result<Vec<AssetView>, CoreError> {
        Ok(self.store.list(filter).await?)
    }

    pub async fn page(
        &self,
        request: &PageRequest,
        filter: &AssetFilter,
    ) -> Result<Page<AssetView>, CoreError> {
        Ok(self.store.page(request, filter).await?)
    }

    /// Absence is `Ok(None)`, never an error.
    pub async fn get(&self, id: DbId) -> Result<Option<AssetView>, CoreError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn search(&self, q: &str) -> Result<Vec<AssetView>, CoreError> {
        Ok(self.store.search_text(q).await?)
    }

    pub async fn by_service(&self, service_id: DbId) -> Result<Vec<AssetView>, CoreError> {
        Ok(self.store.find_by_service(service_id).await?)
    }

    /// Audit trail of an asset, newest first. Works for deleted and unknown
    /// ids alike.
    pub async fn history(&self, asset_id: DbId) -> Result<Vec<AuditEntry>, CoreError> {
        Ok(self.store.history_for(asset_id).await?)
    }

    pub async fn statistics(&self) -> Result<AssetStatistics, CoreError> {
        let total = self.store.count().await?;
        let mut counts = Vec::with_capacity(AssetStatus::ALL.len());
        for status in AssetStatus::ALL {
            counts.push((status, self.store.count_by_status(status).await?));
        }
        let total_value = self.store.total_value().await?;

        Ok(AssetStatistics::from_counts(total, &counts, total_value))
    }

    /// Render the export table. `None` or an empty slice exports every asset.
    pub async fn export_table(&self, ids: Option<&[DbId]>) -> Result<String, CoreError> {
        let assets = match ids {
            Some(ids) if !ids.is_empty() => self.store.get_many(ids).await?,
            _ => self.store.all().await?,
        };
        tracing::debug!(rows = assets.len(), "Rendering asset export");
        Ok(render_table(&assets))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub async fn create(&self, input: CreateAsset, actor: &str) -> Result<AssetView, CoreError> {
        require_actor(actor)?;
        input.validate()?;

        let mut uow = self.store.begin().await?;
        let service_id = self.resolve_service(uow.as_mut(), input.service_id).await?;
        let data = input.into_data(service_id, actor, Utc::now());

        let view = uow.upsert(AssetRecord { id: None, data }).await?;
        uow.append_audit(NewAuditEntry::now(
            view.id(),
            AuditAction::Created,
            details::CREATED,
            actor,
        ))
        .await?;
        uow.commit().await?;

        tracing::info!(asset_id = view.id(), name = %view.asset.data.name, actor, "Asset created");
        Ok(view)
    }

    /// Merge `changes` into an existing asset. Fails with NotFound when the
    /// id does not exist.
    pub async fn update(
        &self,
        id: DbId,
        changes: UpdateAsset,
        actor: &str,
    ) -> Result<AssetView, CoreError> {
        require_actor(actor)?;
        changes.validate()?;

        let mut uow = self.store.begin().await?;
        let mut asset = uow
            .get(id)
            .await?
            .ok_or_else(|| CoreError::asset_not_found(id))?
            .asset;

        if let Some(requested) = changes.service_id {
            // Degrade keeps the stored relationship when the id is unknown.
            if let Some(service_id) = self.resolve_service(uow.as_mut(), Some(requested)).await? {
                asset.data.service_id = Some(service_id);
            }
        }
        asset.data.merge(&changes);
        asset.data.touch(actor, Utc::now());

        let view = uow.upsert(asset.into()).await?;
        uow.append_audit(NewAuditEntry::now(id, AuditAction::Updated, details::UPDATED, actor))
            .await?;
        uow.commit().await?;

        tracing::info!(asset_id = id, actor, "Asset updated");
        Ok(view)
    }

    /// Remove an asset. Returns `false` (and writes nothing) when it did not
    /// exist.
    pub async fn delete(&self, id: DbId, actor: &str) -> Result<bool, CoreError> {
        require_actor(actor)?;

        let mut uow = self.store.begin().await?;
        if !uow.delete(id).await? {
            tracing::debug!(asset_id = id, "Delete of absent asset ignored");
            return Ok(false);
        }
        uow.append_audit(NewAuditEntry::now(id, AuditAction::Deleted, details::DELETED, actor))
            .await?;
        uow.commit().await?;

        tracing::info!(asset_id = id, actor, "Asset deleted");
        Ok(true)
    }

    /// Set `status_name` on every existing asset among `ids`.
    ///
    /// The status is parsed before anything is read or written. Unknown ids
    /// are skipped. Returns the updated assets, id ascending, with one
    /// STATUS_CHANGED entry appended per returned asset.
    pub async fn bulk_set_status(
        &self,
        ids: &[DbId],
        status_name: &str,
        actor: &str,
    ) -> Result<Vec<AssetView>, CoreError> {
        let status = AssetStatus::parse(status_name)?;
        require_actor(actor)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut uow = self.store.begin().await?;
        let existing = uow.get_many(ids).await?;
        let now = Utc::now();
        let detail = status_changed_detail(status);

        let mut updated = Vec::with_capacity(existing.len());
        for view in existing {
            let mut asset = view.asset;
            asset.data.status = status;
            asset.data.touch(actor, now);
            updated.push(uow.upsert(asset.into()).await?);
        }
        for view in &updated {
            uow.append_audit(NewAuditEntry::now(
                view.id(),
                AuditAction::StatusChanged,
                detail.clone(),
                actor,
            ))
            .await?;
        }
        uow.commit().await?;

        tracing::info!(
            requested = ids.len(),
            updated = updated.len(),
            status = %status,
            actor,
            "Bulk status change applied",
        );
        Ok(updated)
    }

    /// Remove every existing asset among `ids`. Returns the ids actually
    /// removed, ascending; each gets one DELETED entry.
    pub async fn bulk_delete(&self, ids: &[DbId], actor: &str) -> Result<Vec<DbId>, CoreError> {
        require_actor(actor)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut uow = self.store.begin().await?;
        let removed = uow.delete_many(ids).await?;
        for &id in &removed {
            uow.append_audit(NewAuditEntry::now(
                id,
                AuditAction::Deleted,
                details::BULK_DELETED,
                actor,
            ))
            .await?;
        }
        uow.commit().await?;

        tracing::info!(
            requested = ids.len(),
            deleted = removed.len(),
            actor,
            "Bulk delete applied",
        );
        Ok(removed)
    }

    /// Map a requested service id to a stored one according to the policy.
    async fn resolve_service(
        &self,
        uow: &mut dyn AssetUnitOfWork,
        requested: Option<DbId>,
    ) -> Result<Option<DbId>, CoreError> {
        let Some(id) = requested else {
            return Ok(None);
        };
        if uow.find_service(id).await?.is_some() {
            return Ok(Some(id));
        }
        match self.service_resolution {
            ServiceResolution::Degrade => {
                tracing::warn!(service_id = id, "Unknown service on asset write, relationship not applied");
                Ok(None)
            }
            ServiceResolution::Strict => Err(CoreError::Validation(format!(
                "Service with id {id} does not exist"
            ))),
        }
    }
}

fn require_actor(actor: &str) -> Result<(), CoreError> {
    if actor.trim().is_empty() {
        return Err(CoreError::Validation("Actor identity must not be empty".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use assert_matches::assert_matches;
    use rust_decimal::Decimal;

    use super::*;
    use crate::assets::AssetCategory;
    use crate::services::CreateService;
    use crate::store::memory::MemoryStore;
    use crate::store::{AssetStore, ServiceDirectory};

    fn lifecycle(policy: ServiceResolution) -> (AssetLifecycle, MemoryStore) {
        let store = MemoryStore::new();
        (AssetLifecycle::new(Arc::new(store.clone()), policy), store)
    }

    fn create_req(name: &str) -> CreateAsset {
        CreateAsset {
            name: name.into(),
            reference: None,
            description: None,
            category: Some(AssetCategory::It),
            status: AssetStatus::InService,
            acquisition_date: None,
            value: None,
            serial_number: None,
            location: None,
            service_id: None,
        }
    }

    fn money(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn service(store: &MemoryStore, name: &str) -> DbId {
        store
            .create_service(&CreateService {
                name: name.into(),
                description: None,
                code: None,
                responsible: None,
                email: None,
                phone: None,
                active: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_stamps_actor_and_logs_once() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let mut req = create_req("Theodolite");
        req.value = Some(money("1000.00"));

        let view = lc.create(req, "alice").await.unwrap();
        assert_eq!(view.asset.data.created_by, "alice");
        assert!(view.asset.data.updated_at.is_none());

        let fetched = lc.get(view.id()).await.unwrap().unwrap();
        assert_eq!(fetched.asset.data.value, Some(money("1000.00")));
        assert_eq!(fetched.asset.data.value.unwrap().to_string(), "1000.00");
        assert_eq!(fetched.asset.data.status, AssetStatus::InService);

        let history = lc.history(view.id()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, AuditAction::Created);
        assert_eq!(history[0].asset_id, view.id());
        assert_eq!(history[0].detail, details::CREATED);
        assert_eq!(history[0].actor, "alice");
    }

    #[tokio::test]
    async fn blank_actor_is_rejected_before_writing() {
        let (lc, store) = lifecycle(ServiceResolution::Degrade);
        assert_matches!(
            lc.create(create_req("x"), "  ").await,
            Err(CoreError::Validation(_))
        );
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn negative_value_is_rejected_on_create_and_update() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let mut req = create_req("Desk");
        req.value = Some(money("-1"));
        assert_matches!(lc.create(req, "alice").await, Err(CoreError::Validation(_)));

        let view = lc.create(create_req("Desk"), "alice").await.unwrap();
        let changes = UpdateAsset {
            value: Some(money("-0.50")),
            ..Default::default()
        };
        assert_matches!(
            lc.update(view.id(), changes, "alice").await,
            Err(CoreError::Validation(_))
        );
        assert_eq!(lc.history(view.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_merges_only_present_fields() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let mut req = create_req("GPS");
        req.reference = Some("GPS-7".into());
        req.location = Some("Depot".into());
        let before = lc.create(req, "alice").await.unwrap();

        let after = lc
            .update(
                before.id(),
                UpdateAsset {
                    value: Some(money("250.50")),
                    ..Default::default()
                },
                "bob",
            )
            .await
            .unwrap();

        let (b, a) = (&before.asset.data, &after.asset.data);
        assert_eq!(a.value, Some(money("250.50")));
        assert_eq!(a.name, b.name);
        assert_eq!(a.reference, b.reference);
        assert_eq!(a.location, b.location);
        assert_eq!(a.status, b.status);
        assert_eq!(a.category, b.category);
        assert_eq!(a.created_at, b.created_at);
        assert_eq!(a.created_by, "alice");
        assert_eq!(a.modified_by.as_deref(), Some("bob"));
        assert!(a.updated_at.is_some());

        let history = lc.history(before.id()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, AuditAction::Updated);
        assert_eq!(history[0].actor, "bob");
    }

    #[tokio::test]
    async fn update_of_missing_asset_is_not_found() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        assert_matches!(
            lc.update(42, UpdateAsset::default(), "alice").await,
            Err(CoreError::NotFound { entity: "Asset", id: 42 })
        );
        assert!(lc.history(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn degrade_policy_ignores_unknown_service() {
        let (lc, store) = lifecycle(ServiceResolution::Degrade);
        let ops = service(&store, "Operations").await;

        let mut req = create_req("Van");
        req.service_id = Some(9999);
        let orphan = lc.create(req, "alice").await.unwrap();
        assert_eq!(orphan.asset.data.service_id, None);

        let mut req = create_req("Truck");
        req.service_id = Some(ops);
        let owned = lc.create(req, "alice").await.unwrap();
        assert_eq!(owned.service_name.as_deref(), Some("Operations"));

        let after = lc
            .update(
                owned.id(),
                UpdateAsset {
                    service_id: Some(9999),
                    ..Default::default()
                },
                "alice",
            )
            .await
            .unwrap();
        assert_eq!(after.asset.data.service_id, Some(ops));
    }

    #[tokio::test]
    async fn strict_policy_rejects_unknown_service_without_writing() {
        let (lc, store) = lifecycle(ServiceResolution::Strict);
        let mut req = create_req("Van");
        req.service_id = Some(9999);

        assert_matches!(lc.create(req, "alice").await, Err(CoreError::Validation(_)));
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(lc.history(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_can_move_asset_between_services() {
        let (lc, store) = lifecycle(ServiceResolution::Strict);
        let first = service(&store, "North").await;
        let second = service(&store, "South").await;

        let mut req = create_req("Drone");
        req.service_id = Some(first);
        let view = lc.create(req, "alice").await.unwrap();

        let moved = lc
            .update(
                view.id(),
                UpdateAsset {
                    service_id: Some(second),
                    ..Default::default()
                },
                "alice",
            )
            .await
            .unwrap();
        assert_eq!(moved.asset.data.service_id, Some(second));
        assert_eq!(moved.service_name.as_deref(), Some("South"));
        assert_eq!(lc.by_service(second).await.unwrap().len(), 1);
        assert!(lc.by_service(first).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_keeps_history() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let view = lc.create(create_req("Chair"), "alice").await.unwrap();

        assert!(lc.delete(view.id(), "bob").await.unwrap());
        assert!(!lc.delete(view.id(), "bob").await.unwrap());
        assert!(lc.get(view.id()).await.unwrap().is_none());

        let history = lc.history(view.id()).await.unwrap();
        let actions: Vec<_> = history.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![AuditAction::Deleted, AuditAction::Created]);
    }

    #[tokio::test]
    async fn bulk_status_skips_unknown_ids() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let a = lc.create(create_req("A"), "system").await.unwrap();

        let updated = lc
            .bulk_set_status(&[a.id(), 999_999], "BROKEN", "alice")
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].id(), a.id());
        assert_eq!(updated[0].asset.data.status, AssetStatus::Broken);
        assert_eq!(updated[0].asset.data.modified_by.as_deref(), Some("alice"));

        let history = lc.history(a.id()).await.unwrap();
        let changed: Vec<_> = history
            .iter()
            .filter(|e| e.action == AuditAction::StatusChanged)
            .collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].detail, "Status changed to BROKEN");
        assert!(lc.history(999_999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bulk_status_with_invalid_name_changes_nothing() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let a = lc.create(create_req("A"), "system").await.unwrap();

        assert_matches!(
            lc.bulk_set_status(&[a.id()], "SCRAPPED", "alice").await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            lc.bulk_set_status(&[], "SCRAPPED", "alice").await,
            Err(CoreError::Validation(_))
        );

        let stored = lc.get(a.id()).await.unwrap().unwrap();
        assert_eq!(stored, a);
        assert_eq!(lc.history(a.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn any_status_transition_is_allowed() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let a = lc.create(create_req("A"), "system").await.unwrap();
        for status in ["out_of_service", "IN_SERVICE", "In_Maintenance", "BROKEN", "IN_SERVICE"] {
            let updated = lc.bulk_set_status(&[a.id()], status, "alice").await.unwrap();
            assert_eq!(updated[0].asset.data.status, AssetStatus::parse(status).unwrap());
        }
    }

    #[tokio::test]
    async fn bulk_delete_logs_only_removed_assets() {
        let (lc, store) = lifecycle(ServiceResolution::Degrade);
        let a = lc.create(create_req("A"), "system").await.unwrap();
        let b = lc.create(create_req("B"), "system").await.unwrap();

        let removed = lc
            .bulk_delete(&[b.id(), 777, a.id(), b.id()], "alice")
            .await
            .unwrap();
        assert_eq!(removed, vec![a.id(), b.id()]);
        assert_eq!(store.count().await.unwrap(), 0);

        for id in [a.id(), b.id()] {
            let history = lc.history(id).await.unwrap();
            assert_eq!(history[0].action, AuditAction::Deleted);
            assert_eq!(history[0].detail, details::BULK_DELETED);
        }
        assert!(lc.history(777).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn statistics_are_consistent_and_exact() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let mut cheap = create_req("Cable");
        cheap.value = Some(money("0.10"));
        let mut pricey = create_req("Server");
        pricey.value = Some(money("0.20"));
        let c = lc.create(cheap, "system").await.unwrap();
        lc.create(pricey, "system").await.unwrap();
        lc.create(create_req("Unpriced"), "system").await.unwrap();
        lc.bulk_set_status(&[c.id()], "BROKEN", "system").await.unwrap();

        let stats = lc.statistics().await.unwrap();
        assert_eq!(stats.total_assets, 3);
        assert_eq!(stats.active_assets, 2);
        assert_eq!(stats.broken_assets, 1);
        assert_eq!(stats.by_status.values().sum::<i64>(), stats.total_assets);
        assert_eq!(stats.total_value, money("0.30"));
    }

    #[tokio::test]
    async fn export_replaces_commas_and_keeps_id_order() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        for name in ["Tripod", "Level, digital", "Prism"] {
            let mut req = create_req(name);
            req.description = Some("old, worn".into());
            lc.create(req, "system").await.unwrap();
        }

        let table = lc.export_table(None).await.unwrap();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2,Level  digital,"));
        for line in &lines {
            assert_eq!(line.split(',').count(), 10);
        }

        let subset = lc.export_table(Some(&[3, 1][..])).await.unwrap();
        let ids: Vec<_> = subset
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);

        assert_eq!(lc.export_table(Some(&[][..])).await.unwrap(), table);
    }

    #[tokio::test]
    async fn history_is_stable_under_requery() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let a = lc.create(create_req("A"), "system").await.unwrap();
        lc.bulk_set_status(&[a.id()], "BROKEN", "alice").await.unwrap();
        lc.update(a.id(), UpdateAsset::default(), "bob").await.unwrap();

        let first = lc.history(a.id()).await.unwrap();
        let second = lc.history(a.id()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].action, AuditAction::Updated);
    }

    #[tokio::test]
    async fn list_and_page_apply_the_same_filter() {
        let (lc, store) = lifecycle(ServiceResolution::Degrade);
        let unit = service(&store, "Survey").await;
        for (name, in_unit) in [("Printer A", true), ("Printer B", true), ("Scanner", true), ("Printer C", false)] {
            let mut req = create_req(name);
            req.service_id = in_unit.then_some(unit);
            lc.create(req, "system").await.unwrap();
        }
        lc.bulk_set_status(&[1], "BROKEN", "system").await.unwrap();

        let filter = AssetFilter {
            service_id: Some(unit),
            status: Some(AssetStatus::InService),
            search: Some("printer".into()),
        };
        let listed = lc.list(&filter).await.unwrap();
        let paged = lc.page(&PageRequest::default(), &filter).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(paged.total_elements, 1);
        assert_eq!(paged.content, listed);
        assert_eq!(listed[0].asset.data.name, "Printer B");
    }

    #[tokio::test]
    async fn search_matches_reference_too() {
        let (lc, _) = lifecycle(ServiceResolution::Degrade);
        let mut req = create_req("Total station");
        req.reference = Some("TS-15".into());
        lc.create(req, "system").await.unwrap();
        lc.create(create_req("Tablet"), "system").await.unwrap();

        assert_eq!(lc.search("ts-1").await.unwrap().len(), 1);
        assert_eq!(lc.search("T").await.unwrap().len(), 2);
    }
}
