//! Environment REST API Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use mirror_core::Environment;
use serde_json::Value;

use crate::{
    error::{ApiError, ApiResult},
    extractors::PathObjectId,
    middleware::AuthExtractor,
    services,
    state::SharedStore,
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /environment/{id} - Get an environment
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/environment/{id}",
    tag = "Environments",
    params(("id" = String, Path, description = "24-character hex environment id")),
    responses(
        (status = 200, description = "Environment found", body = Environment),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Environment not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn get_environment(
    State(store): State<SharedStore>,
    _auth: AuthExtractor,
    PathObjectId(id): PathObjectId,
) -> ApiResult<Json<Environment>> {
    let environment = services::get_environment(store.as_ref(), &id).await?;
    Ok(Json(environment))
}

/// PATCH /environment/{id} - Partially update an environment
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/environment/{id}",
    tag = "Environments",
    params(("id" = String, Path, description = "24-character hex environment id")),
    request_body = mirror_core::UpdateEnvironmentRequest,
    responses(
        (status = 200, description = "Environment updated", body = Environment),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Environment not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn update_environment(
    State(store): State<SharedStore>,
    AuthExtractor(auth): AuthExtractor,
    PathObjectId(id): PathObjectId,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Environment>> {
    let Json(body) = body.map_err(|e| ApiError::invalid_input(e.body_text()))?;
    tracing::debug!(user_id = %auth.user_id, environment_id = %id, "Environment update requested");
    let updated = services::update_environment(store.as_ref(), &id, body).await?;
    Ok(Json(updated))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        .route("/:id", get(get_environment).patch(update_environment))
        .with_state(store)
}
