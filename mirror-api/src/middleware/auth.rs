//! Axum Middleware for Authentication
//!
//! Validates the `Authorization: Bearer <jwt>` header, injects the resulting
//! [`AuthContext`] into request extensions and returns 401 otherwise.

use crate::auth::{authenticate, AuthConfig, AuthContext};
use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Axum middleware for caller authentication.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware};
/// use mirror_api::middleware::auth_middleware;
///
/// let auth = Arc::new(AuthConfig::from_env());
/// let app = Router::new()
///     .route("/space/search", axum::routing::get(|| async { "OK" }))
///     .layer(middleware::from_fn_with_state(auth, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(config): State<Arc<AuthConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let auth_context = authenticate(&config, auth_header).map_err(|err| {
        tracing::debug!(
            path = %request.uri().path(),
            code = %err.code,
            "Rejected unauthenticated request"
        );
        AuthMiddlewareError(err)
    })?;

    tracing::Span::current().record("user_id", auth_context.user_id.as_str());
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Rejection produced by the auth middleware and extractor.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

// ============================================================================
// TYPED EXTRACTOR
// ============================================================================

/// Typed Axum extractor for the authenticated caller.
///
/// `auth_middleware` must run on the route; otherwise extraction fails with
/// a 500.
#[derive(Debug, Clone)]
pub struct AuthExtractor(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
{
    type Rejection = AuthMiddlewareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthExtractor)
            .ok_or_else(|| {
                AuthMiddlewareError(ApiError::internal_error(
                    "AuthContext not found in request extensions. \
                     Ensure auth_middleware is applied to this route.",
                ))
            })
    }
}

impl std::ops::Deref for AuthExtractor {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
