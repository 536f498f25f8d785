pub mod assets;
pub mod health;
pub mod services;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /assets                          list (GET), bulk delete (DELETE), create (POST)
/// /assets/paginated                page envelope
/// /assets/stats                    aggregate statistics
/// /assets/search                   substring search (?q=)
/// /assets/export                   delimited download (POST)
/// /assets/bulk/status              bulk status change (PATCH)
/// /assets/service/{service_id}     assets of one service
/// /assets/{id}                     get, update, delete
/// /assets/{id}/history             audit trail
///
/// /services                        list (?active=), create
/// /services/paginated              page envelope
/// /services/search                 name search (?q=)
/// /services/{id}                   get, update, delete
/// /services/{id}/toggle            flip active flag (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/assets", assets::router())
        .nest("/services", services::router())
}
