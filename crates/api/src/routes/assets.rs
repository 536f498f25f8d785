//! Route definitions for the asset registry.
//!
//! All routes are mounted under `/assets`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Asset routes mounted at `/assets`.
///
/// ```text
/// GET    /                          -> list_assets
/// POST   /                          -> create_asset
/// DELETE /                          -> bulk_delete_assets
/// GET    /paginated                 -> page_assets
/// GET    /stats                     -> get_statistics
/// GET    /search                    -> search_assets
/// POST   /export                    -> export_assets
/// PATCH  /bulk/status               -> bulk_update_status
/// GET    /service/{service_id}      -> assets_by_service
/// GET    /{id}                      -> get_asset
/// PUT    /{id}                      -> update_asset
/// DELETE /{id}                      -> delete_asset
/// GET    /{id}/history              -> asset_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(assets::list_assets)
                .post(assets::create_asset)
                .delete(assets::bulk_delete_assets),
        )
        .route("/paginated", get(assets::page_assets))
        .route("/stats", get(assets::get_statistics))
        .route("/search", get(assets::search_assets))
        .route("/export", post(assets::export_assets))
        .route("/bulk/status", patch(assets::bulk_update_status))
        .route("/service/{service_id}", get(assets::assets_by_service))
        .route(
            "/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/{id}/history", get(assets::asset_history))
}
