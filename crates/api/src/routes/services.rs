//! Route definitions for the service directory, mounted under `/services`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::services;
use crate::state::AppState;

/// ```text
/// GET    /                 -> list_services
/// POST   /                 -> create_service
/// GET    /paginated        -> page_services
/// GET    /search           -> search_services
/// GET    /{id}             -> get_service
/// PUT    /{id}             -> update_service
/// DELETE /{id}             -> delete_service
/// PATCH  /{id}/toggle      -> toggle_service
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(services::list_services).post(services::create_service),
        )
        .route("/paginated", get(services::page_services))
        .route("/search", get(services::search_services))
        .route(
            "/{id}",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route("/{id}/toggle", patch(services::toggle_service))
}
