//! Integration tests for the PostgreSQL store.
//!
//! Exercises the repositories through `PgStore` against a real database.
//! Run with `DATABASE_URL` set and `cargo test -p gactif-db -- --ignored`.

use std::str::FromStr;
use std::sync::Arc;

use assert_matches::assert_matches;
use gactif_core::assets::filter::{AssetFilter, PageRequest};
use gactif_core::assets::{AssetStatus, CreateAsset, UpdateAsset};
use gactif_core::audit::AuditAction;
use gactif_core::error::CoreError;
use gactif_core::lifecycle::AssetLifecycle;
use gactif_core::services::{CreateService, ServiceResolution};
use gactif_core::store::{AssetStore, AuditLog, ServiceDirectory};
use gactif_db::store::PgStore;
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_asset(name: &str, reference: Option<&str>) -> CreateAsset {
    CreateAsset {
        name: name.to_string(),
        reference: reference.map(str::to_string),
        description: None,
        category: None,
        status: AssetStatus::InService,
        acquisition_date: None,
        value: None,
        serial_number: None,
        location: None,
        service_id: None,
    }
}

fn new_service(name: &str) -> CreateService {
    CreateService {
        name: name.to_string(),
        description: None,
        code: None,
        responsible: None,
        email: None,
        phone: None,
        active: None,
    }
}

fn setup(pool: PgPool, policy: ServiceResolution) -> (AssetLifecycle, PgStore) {
    let store = PgStore::new(pool);
    (AssetLifecycle::new(Arc::new(store.clone()), policy), store)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_persists_exact_value_and_audit(pool: PgPool) {
    let (lc, store) = setup(pool, ServiceResolution::Degrade);
    let mut input = new_asset("Theodolite", Some("TH-1"));
    input.value = Some(Decimal::from_str("1000.00").unwrap());

    let created = lc.create(input, "alice").await.unwrap();
    let fetched = store.get(created.id()).await.unwrap().unwrap();

    assert_eq!(fetched.asset.data.value.unwrap().to_string(), "1000.00");
    assert_eq!(fetched.asset.data.created_by, "alice");

    let history = store.history_for(created.id()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, AuditAction::Created);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn service_name_is_joined_and_survives_orphaning(pool: PgPool) {
    let (lc, store) = setup(pool, ServiceResolution::Strict);
    let service = store.create_service(&new_service("Survey")).await.unwrap();

    let mut input = new_asset("GPS", None);
    input.service_id = Some(service.id);
    let created = lc.create(input, "alice").await.unwrap();
    assert_eq!(created.service_name.as_deref(), Some("Survey"));

    assert!(store.delete_service(service.id).await.unwrap());
    let orphan = store.get(created.id()).await.unwrap().unwrap();
    assert_eq!(orphan.asset.data.service_id, Some(service.id));
    assert_eq!(orphan.service_name, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn strict_policy_rolls_back_nothing_written(pool: PgPool) {
    let (lc, store) = setup(pool, ServiceResolution::Strict);
    let mut input = new_asset("Van", None);
    input.service_id = Some(424_242);

    assert_matches!(lc.create(input, "alice").await, Err(CoreError::Validation(_)));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn search_and_paging_share_the_filter(pool: PgPool) {
    let (lc, store) = setup(pool, ServiceResolution::Degrade);
    lc.create(new_asset("Laptop", Some("LT_01")), "system").await.unwrap();
    lc.create(new_asset("Desk", Some("LTX01")), "system").await.unwrap();
    lc.create(new_asset("Printer", None), "system").await.unwrap();

    // Underscore matches literally, not as a wildcard.
    let found = lc.search("lt_").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].asset.data.name, "Laptop");

    let filter = AssetFilter::text("lt");
    let page = store
        .page(&PageRequest::new(Some(0), Some(1), Some("name"), Some("asc")).unwrap(), &filter)
        .await
        .unwrap();
    assert_eq!(page.total_elements, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.content[0].asset.data.name, "Desk");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn bulk_operations_touch_existing_rows_only(pool: PgPool) {
    let (lc, store) = setup(pool, ServiceResolution::Degrade);
    let a = lc.create(new_asset("A", None), "system").await.unwrap();
    let b = lc.create(new_asset("B", None), "system").await.unwrap();

    let updated = lc
        .bulk_set_status(&[b.id(), 999_999, a.id()], "broken", "alice")
        .await
        .unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(store.count_by_status(AssetStatus::Broken).await.unwrap(), 2);

    let removed = lc.bulk_delete(&[a.id(), 999_999], "alice").await.unwrap();
    assert_eq!(removed, vec![a.id()]);
    assert!(store.history_for(999_999).await.unwrap().is_empty());

    let history = store.history_for(a.id()).await.unwrap();
    assert_eq!(history[0].action, AuditAction::Deleted);
    assert_eq!(history.len(), 3);

    let changed = lc
        .update(b.id(), UpdateAsset { value: Some(Decimal::new(5, 1)), ..Default::default() }, "bob")
        .await
        .unwrap();
    assert_eq!(changed.asset.data.status, AssetStatus::Broken);
    assert_eq!(store.total_value().await.unwrap(), Decimal::new(5, 1));

    let removed = lc.bulk_delete(&[b.id(), b.id()], "alice").await.unwrap();
    assert_eq!(removed, vec![b.id()]);
    assert_eq!(store.count().await.unwrap(), 0);
}
