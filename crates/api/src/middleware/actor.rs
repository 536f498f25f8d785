//! Acting-identity extractor for mutating handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the caller's identity for audit attribution.
pub const ACTOR_HEADER: &str = "x-actor";

/// Identity recorded on audit entries and `createdBy`/`modifiedBy`.
///
/// Taken from the `X-Actor` header; a missing or blank header falls back to
/// the configured default actor.
///
/// ```ignore
/// async fn my_handler(actor: Actor) -> AppResult<Json<()>> {
///     tracing::info!(actor = %actor.0, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let supplied = match parts.headers.get(ACTOR_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| AppError::BadRequest("X-Actor header must be valid UTF-8".into()))?
                .trim(),
            None => "",
        };

        if supplied.is_empty() {
            return Ok(Actor(state.config.default_actor.clone()));
        }
        Ok(Actor(supplied.to_string()))
    }
}
