//! Handlers for the service directory.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gactif_core::error::CoreError;
use gactif_core::services::{validate_payload, CreateService, UpdateService};
use gactif_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::query::{page_request, ActiveParams, SearchParams};
use crate::response::ApiResponse;
use crate::state::AppState;

fn service_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Service",
        id,
    })
}

/// GET /api/v1/services?active=
pub async fn list_services(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ActiveParams>,
) -> AppResult<impl IntoResponse> {
    let services = state
        .store
        .list_services(params.active.unwrap_or(false))
        .await?;
    Ok(Json(ApiResponse::ok(services)))
}

/// GET /api/v1/services/paginated?page=&size=
pub async fn page_services(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> AppResult<impl IntoResponse> {
    let request = page_request(&params)?;
    let page = state.store.page_services(&request).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/v1/services/{id}
pub async fn get_service(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let service = state
        .store
        .get_service(id)
        .await?
        .ok_or_else(|| service_not_found(id))?;
    Ok(Json(ApiResponse::ok(service)))
}

/// GET /api/v1/services/search?q=
pub async fn search_services(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let services = state.store.search_services(&params.q).await?;
    Ok(Json(ApiResponse::ok(services)))
}

/// POST /api/v1/services
pub async fn create_service(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateService>,
) -> AppResult<impl IntoResponse> {
    validate_payload(&input)?;
    let service = state.store.create_service(&input).await?;

    tracing::info!(service_id = service.id, name = %service.name, "Service created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(service, "Service created")),
    ))
}

/// PUT /api/v1/services/{id}
pub async fn update_service(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(changes): AppJson<UpdateService>,
) -> AppResult<impl IntoResponse> {
    validate_payload(&changes)?;
    let service = state
        .store
        .update_service(id, &changes)
        .await?
        .ok_or_else(|| service_not_found(id))?;

    tracing::info!(service_id = id, "Service updated");
    Ok(Json(ApiResponse::ok_with_message(service, "Service updated")))
}

/// PATCH /api/v1/services/{id}/toggle
///
/// Flip the active flag.
pub async fn toggle_service(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let current = state
        .store
        .get_service(id)
        .await?
        .ok_or_else(|| service_not_found(id))?;

    let changes = UpdateService {
        active: Some(!current.active),
        ..Default::default()
    };
    let service = state
        .store
        .update_service(id, &changes)
        .await?
        .ok_or_else(|| service_not_found(id))?;

    tracing::info!(service_id = id, active = service.active, "Service toggled");
    Ok(Json(ApiResponse::ok(service)))
}

/// DELETE /api/v1/services/{id}
///
/// Assets that referenced the service keep their `serviceId`.
pub async fn delete_service(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if state.store.delete_service(id).await? {
        tracing::info!(service_id = id, "Service deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}
