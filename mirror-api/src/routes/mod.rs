//! REST API Routes Module
//!
//! Route handlers organized by resource, plus the router builder that wires
//! authentication, observability and CORS around them.
//!
//! Includes:
//! - Space search, space object tags and environment routes (auth required)
//! - Health checks, version and metrics (public)
//! - The WebSocket zone gateway at `/` and `/ws` (shared-secret auth)

pub mod environment;
pub mod health;
pub mod space;
pub mod space_object;
pub mod util;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_middleware;
use crate::state::{AppState, SharedStore};
use crate::telemetry::{metrics_enabled, metrics_handler, observability_middleware, REQUEST_ID_HEADER};
use crate::ws;

pub use environment::create_router as environment_router;
pub use health::create_router as health_router;
pub use space::create_router as space_router;
pub use space_object::create_router as space_object_router;
pub use util::create_router as util_router;

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

/// Handler for /openapi.json endpoint.
///
/// With `swagger-ui` enabled the Swagger router serves the same document.
#[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
async fn openapi_json() -> impl axum::response::IntoResponse {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// PRODUCTION VALIDATION
// ============================================================================

/// Validate API configuration for production use.
fn validate_api_config_for_production(config: &ApiConfig) -> ApiResult<()> {
    if config.cors_origins.is_empty() {
        return Err(ApiError::internal_error(
            "CORS origins not configured for production. Set MIRROR_CORS_ORIGINS.",
        ));
    }
    Ok(())
}

// ============================================================================
// ROUTER BUILDER
// ============================================================================

/// Builder for the full API router.
///
/// Resource routes sit behind the identity middleware. Health, version and
/// metrics stay public. The WebSocket gateway checks its own shared secret.
pub struct RouterBuilder {
    state: AppState,
    api_config: ApiConfig,
}

impl RouterBuilder {
    /// Create a new builder.
    ///
    /// In production this validates the security settings and refuses to
    /// build with insecure defaults.
    pub fn new(store: SharedStore, api_config: ApiConfig, auth_config: AuthConfig) -> ApiResult<Self> {
        let is_production = api_config.is_production();
        auth_config.validate_for_production(is_production)?;
        if is_production {
            validate_api_config_for_production(&api_config)?;
        }

        Ok(Self {
            state: AppState::new(store, auth_config),
            api_config,
        })
    }

    /// Resource routes (require authentication).
    fn build_resource_routes(&self) -> Router {
        let store = self.state.store.clone();
        Router::new()
            .nest("/space", space::create_router(store.clone()))
            .nest("/space-object", space_object::create_router(store.clone()))
            .nest("/environment", environment::create_router(store))
            .layer(from_fn_with_state(self.state.auth.clone(), auth_middleware))
    }

    /// Build the complete router.
    ///
    /// # Middleware Order (outer to inner)
    /// 1. CORS (outermost) - handles preflight requests
    /// 2. Observability - request id, tracing and metrics
    /// 3. Auth (resource routes only)
    pub fn build(self) -> Router {
        let mut router = Router::new()
            .merge(self.build_resource_routes())
            .merge(ws::create_router(self.state.clone()))
            .nest(
                "/health",
                health::create_router(self.state.store.clone(), self.state.start_time),
            )
            .nest("/util", util::create_router());

        if metrics_enabled() {
            router = router.route("/metrics", get(metrics_handler));
        }

        #[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
        {
            router = router.route("/openapi.json", get(openapi_json));
        }

        #[cfg(feature = "swagger-ui")]
        {
            use utoipa::OpenApi;
            use utoipa_swagger_ui::SwaggerUi;
            router = router.merge(
                SwaggerUi::new("/swagger-ui").url("/openapi.json", crate::openapi::ApiDoc::openapi()),
            );
        }

        let cors = build_cors_layer(&self.api_config);

        router
            .layer(from_fn(observability_middleware))
            .layer(cors)
    }
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// Empty origins allow all (development); otherwise only configured origins,
/// including `*.domain` wildcard entries.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([REQUEST_ID_HEADER.clone()])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        return cors.allow_origin(Any);
    }

    tracing::info!(
        "CORS: Production mode - allowing origins: {:?}",
        config.cors_origins
    );
    let allowed = config.clone();
    let cors = cors.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        origin
            .to_str()
            .is_ok_and(|origin| allowed.is_origin_allowed(origin))
    }));

    if config.cors_allow_credentials {
        cors.allow_credentials(true)
    } else {
        cors
    }
}

/// Create the complete API router.
///
/// - `/space/*`, `/space-object/*`, `/environment/*` require a bearer token
/// - `/` and `/ws` upgrade to the zone gateway with `WSS_SECRET`
/// - `/health/*`, `/util/version` and, unless disabled, `/metrics` are public
/// - `/openapi.json` and `/swagger-ui` when the features are enabled
pub fn create_api_router(
    store: SharedStore,
    api_config: &ApiConfig,
    auth_config: AuthConfig,
) -> ApiResult<Router> {
    Ok(RouterBuilder::new(store, api_config.clone(), auth_config)?.build())
}
