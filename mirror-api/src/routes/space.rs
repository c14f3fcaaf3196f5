//! Space REST API Routes
//!
//! GET /space/search runs the paginated space search. The query string is
//! collected as raw pairs so repeated `tag` keys survive as a sequence.

use axum::{extract::State, routing::get, Json, Router};

use crate::{
    error::ApiResult,
    extractors::SearchQuery,
    middleware::AuthExtractor,
    services,
    state::SharedStore,
};
use mirror_storage::SpacePage;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /space/search - Search spaces
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/space/search",
    tag = "Spaces",
    params(
        ("field" = Option<String>, Query, description = "Attribute matched by `search` (name, description)"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring"),
        ("sortKey" = Option<String>, Query, description = "Sort attribute, default updatedAt"),
        ("sortDirection" = Option<String>, Query, description = "asc or desc, default desc"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("perPage" = Option<u64>, Query, description = "Page size, at most 100"),
        ("startItem" = Option<u64>, Query, description = "Offset; takes precedence over page"),
        ("numberOfItems" = Option<u64>, Query, description = "Limit paired with startItem"),
        ("tag" = Option<Vec<String>>, Query, description = "Required tags; repeat the key for several"),
        ("tagType" = Option<String>, Query, description = "Tag type; required when tag is given"),
    ),
    responses(
        (status = 200, description = "One page of matching spaces", body = SpacePage),
        (status = 400, description = "Invalid query", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn search_spaces(
    State(store): State<SharedStore>,
    AuthExtractor(auth): AuthExtractor,
    SearchQuery(raw): SearchQuery,
) -> ApiResult<Json<SpacePage>> {
    tracing::debug!(user_id = %auth.user_id, "Space search requested");
    let page = services::search_spaces(store.as_ref(), &raw).await?;
    Ok(Json(page))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        .route("/search", get(search_spaces))
        .with_state(store)
}
