//! Liveness and readiness endpoints
//!
//! The process is live while it answers HTTP at all. It is ready once the
//! document store answers its own health check; until then `/health/ready`
//! returns the regular `SERVICE_UNAVAILABLE` error body with status 503.
//!
//! None of these routes require authentication.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, routing::get, Json, Router};
use mirror_core::MirrorResult;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::SharedStore;

/// Lifecycle stage reported by the health endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    /// Serving HTTP; the store has not been consulted.
    Live,
    /// The store answered its health check.
    Ready,
}

/// Body of `/health/live` and `/health/ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: Readiness,
    pub version: String,
    pub uptime_seconds: u64,
    /// Round trip of the store health check, readiness only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_latency_ms: Option<u64>,
}

impl StatusReport {
    fn new(status: Readiness, uptime: Duration) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime.as_secs(),
            store_latency_ms: None,
        }
    }
}

#[derive(Clone)]
pub struct HealthContext {
    store: SharedStore,
    started: Instant,
}

/// GET /health/ping
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses((status = 200, description = "Plain-text pong", body = String)),
))]
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, description = "Process is serving requests", body = StatusReport)),
))]
pub async fn liveness(State(ctx): State<Arc<HealthContext>>) -> Json<StatusReport> {
    Json(StatusReport::new(Readiness::Live, ctx.started.elapsed()))
}

/// GET /health/ready
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Document store is reachable", body = StatusReport),
        (status = 503, description = "Document store failed its health check", body = ApiError),
    ),
))]
pub async fn readiness(State(ctx): State<Arc<HealthContext>>) -> ApiResult<Json<StatusReport>> {
    let checked_at = Instant::now();
    let check = ctx.store.health_check().await;
    readiness_report(check, checked_at.elapsed(), ctx.started.elapsed()).map(Json)
}

fn readiness_report(
    check: MirrorResult<()>,
    latency: Duration,
    uptime: Duration,
) -> ApiResult<StatusReport> {
    check.map_err(|err| {
        tracing::warn!(error = %err, "document store failed its health check");
        ApiError::service_unavailable(format!("Document store unavailable: {}", err))
    })?;

    let mut report = StatusReport::new(Readiness::Ready, uptime);
    report.store_latency_ms = Some(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
    Ok(report)
}

/// Health routes, mounted under `/health`.
pub fn create_router(store: SharedStore, started: Instant) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(Arc::new(HealthContext { store, started }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::http::StatusCode;
    use mirror_core::{ConfigError, MirrorError};

    #[test]
    fn test_ready_report_carries_store_latency() -> Result<(), ApiError> {
        let report = readiness_report(Ok(()), Duration::from_millis(7), Duration::from_secs(90))?;
        assert_eq!(report.status, Readiness::Ready);
        assert_eq!(report.store_latency_ms, Some(7));
        assert_eq!(report.uptime_seconds, 90);
        Ok(())
    }

    #[test]
    fn test_failed_store_check_is_service_unavailable() {
        let failure = MirrorError::from(ConfigError::MissingRequired {
            field: "store".to_string(),
        });
        let err = readiness_report(Err(failure), Duration::ZERO, Duration::ZERO)
            .expect_err("store down");
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.message.starts_with("Document store unavailable"));
    }

    #[test]
    fn test_live_report_omits_store_latency() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(StatusReport::new(Readiness::Live, Duration::from_secs(3)))?;
        assert_eq!(json["status"], "live");
        assert_eq!(json["uptimeSeconds"], 3);
        assert!(json.get("storeLatencyMs").is_none());
        Ok(())
    }
}
