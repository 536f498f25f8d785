//! Handlers for the asset registry.
//!
//! Reads and writes both go through [`AssetLifecycle`](gactif_core::lifecycle::AssetLifecycle);
//! the handlers only translate HTTP to lifecycle calls and wrap results in
//! the response envelope.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gactif_core::assets::export::EXPORT_FILENAME;
use gactif_core::assets::filter::AssetFilter;
use gactif_core::assets::{CreateAsset, UpdateAsset};
use gactif_core::error::CoreError;
use gactif_core::types::DbId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::actor::Actor;
use crate::query::{page_request, SearchParams};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `PATCH /assets/bulk/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusRequest {
    pub asset_ids: Vec<DbId>,
    /// Parsed by the lifecycle manager so an unknown tag fails before any write.
    pub status: String,
}

/// Body of bulk `DELETE /assets`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    pub asset_ids: Vec<DbId>,
}

/// Optional body of `POST /assets/export`.
#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    pub assets: Option<Vec<DbId>>,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/assets
///
/// Unpaged list honoring `serviceId`, `status` and `search`.
pub async fn list_assets(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> AppResult<impl IntoResponse> {
    let filter = AssetFilter::from_params(&params)?;
    let assets = state.lifecycle.list(&filter).await?;

    Ok(Json(ApiResponse::ok(assets)))
}

/// GET /api/v1/assets/paginated
pub async fn page_assets(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> AppResult<impl IntoResponse> {
    let request = page_request(&params)?;
    let filter = AssetFilter::from_params(&params)?;
    let page = state.lifecycle.page(&request, &filter).await?;

    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/v1/assets/{id}
pub async fn get_asset(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let asset = state
        .lifecycle
        .get(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::asset_not_found(id)))?;

    Ok(Json(ApiResponse::ok(asset)))
}

/// GET /api/v1/assets/stats
pub async fn get_statistics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = state.lifecycle.statistics().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/v1/assets/search?q=
pub async fn search_assets(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let assets = state.lifecycle.search(&params.q).await?;
    Ok(Json(ApiResponse::ok(assets)))
}

/// GET /api/v1/assets/service/{service_id}
pub async fn assets_by_service(
    State(state): State<AppState>,
    AppPath(service_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let assets = state.lifecycle.by_service(service_id).await?;
    Ok(Json(ApiResponse::ok(assets)))
}

/// GET /api/v1/assets/{id}/history
///
/// Newest first. Empty, not 404, for ids without history.
pub async fn asset_history(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let entries = state.lifecycle.history(id).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// POST /api/v1/assets/export
///
/// Returns the delimited table as a download. An absent body, a null
/// `assets` or an empty list exports everything.
pub async fn export_assets(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let request: ExportRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ExportRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid export request: {e}")))?
    };

    let table = state.lifecycle.export_table(request.assets.as_deref()).await?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        table,
    ))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/assets
pub async fn create_asset(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(input): AppJson<CreateAsset>,
) -> AppResult<impl IntoResponse> {
    let asset = state.lifecycle.create(input, actor.as_str()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(asset, "Asset created")),
    ))
}

/// PUT /api/v1/assets/{id}
///
/// Partial update: absent or null fields keep their stored values.
pub async fn update_asset(
    State(state): State<AppState>,
    actor: Actor,
    AppPath(id): AppPath<DbId>,
    AppJson(changes): AppJson<UpdateAsset>,
) -> AppResult<impl IntoResponse> {
    let asset = state.lifecycle.update(id, changes, actor.as_str()).await?;

    Ok(Json(ApiResponse::ok_with_message(asset, "Asset updated")))
}

/// DELETE /api/v1/assets/{id}
///
/// 204 whether or not the asset existed.
pub async fn delete_asset(
    State(state): State<AppState>,
    actor: Actor,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    state.lifecycle.delete(id, actor.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/assets/bulk/status
pub async fn bulk_update_status(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(input): AppJson<BulkStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = state
        .lifecycle
        .bulk_set_status(&input.asset_ids, &input.status, actor.as_str())
        .await?;

    let message = format!("{} asset(s) updated", updated.len());
    Ok(Json(ApiResponse::ok_with_message(updated, message)))
}

/// DELETE /api/v1/assets
pub async fn bulk_delete_assets(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(input): AppJson<BulkDeleteRequest>,
) -> AppResult<StatusCode> {
    state
        .lifecycle
        .bulk_delete(&input.asset_ids, actor.as_str())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
