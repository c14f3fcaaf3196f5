//! Space Object REST API Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::patch,
    Json, Router,
};
use mirror_core::SpaceObject;
use serde_json::Value;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    services,
    state::SharedStore,
};

/// PATCH /space-object/tags - Replace one tag type's tags on a space object
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/space-object/tags",
    tag = "Space Objects",
    request_body = mirror_core::UpdateSpaceObjectTagsRequest,
    responses(
        (status = 200, description = "Tags replaced", body = SpaceObject),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Space object not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn update_tags(
    State(store): State<SharedStore>,
    AuthExtractor(auth): AuthExtractor,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SpaceObject>> {
    let Json(body) = body.map_err(|e| ApiError::invalid_input(e.body_text()))?;
    tracing::debug!(user_id = %auth.user_id, "Space object tag update requested");
    let updated = services::update_space_object_tags(store.as_ref(), body).await?;
    Ok(Json(updated))
}

pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        .route("/tags", patch(update_tags))
        .with_state(store)
}
