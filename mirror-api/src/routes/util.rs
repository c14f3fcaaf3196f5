//! Utility Routes

use axum::{routing::get, Router};

/// GET /util/version - Package version as plain text
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/util/version",
    tag = "Util",
    responses((status = 200, description = "Server version", body = String, content_type = "text/plain")),
))]
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn create_router() -> Router {
    Router::new().route("/version", get(version))
}
