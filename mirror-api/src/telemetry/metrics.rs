//! Prometheus Metrics Definitions
//!
//! Defines all Mirror API metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<MirrorMetrics>> = Lazy::new(MirrorMetrics::new);

/// Process-wide recording switch, driven by `MIRROR_METRICS_ENABLED`.
static RECORDING: AtomicBool = AtomicBool::new(true);

/// Turn metric recording and the `/metrics` route on or off.
///
/// Takes effect for routers built afterwards.
pub fn set_metrics_enabled(enabled: bool) {
    RECORDING.store(enabled, Ordering::Relaxed);
}

pub fn metrics_enabled() -> bool {
    RECORDING.load(Ordering::Relaxed)
}

/// Container for all Mirror API metrics.
#[derive(Clone)]
pub struct MirrorMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Current active WebSocket connections
    pub websocket_connections: Gauge,

    /// WebSocket events handled - labels: event, status
    pub ws_events_total: CounterVec,

    /// Rejected payloads - labels: payload, rule
    pub validation_failures_total: CounterVec,
}

fn registration_failed(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

impl MirrorMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "mirror_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_failed("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "mirror_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_failed("http_request_duration_seconds", e))?,

            websocket_connections: register_gauge!(
                "mirror_websocket_connections",
                "Current number of active WebSocket connections"
            )
            .map_err(|e| registration_failed("websocket_connections", e))?,

            ws_events_total: register_counter_vec!(
                "mirror_ws_events_total",
                "Total WebSocket events handled",
                &["event", "status"]
            )
            .map_err(|e| registration_failed("ws_events_total", e))?,

            validation_failures_total: register_counter_vec!(
                "mirror_validation_failures_total",
                "Total rule violations reported to clients",
                &["payload", "rule"]
            )
            .map_err(|e| registration_failed("validation_failures_total", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Increment WebSocket connection count.
    pub fn ws_connected(&self) {
        self.websocket_connections.inc();
    }

    /// Decrement WebSocket connection count.
    pub fn ws_disconnected(&self) {
        self.websocket_connections.dec();
    }

    /// Record a handled WebSocket event.
    pub fn record_ws_event(&self, event: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        self.ws_events_total
            .with_label_values(&[event, status])
            .inc();
    }

    /// Record one violated rule on a named payload.
    pub fn record_validation_failure(&self, payload: &str, rule: &str) {
        self.validation_failures_total
            .with_label_values(&[payload, rule])
            .inc();
    }
}

/// Run `f` against the global metrics, skipping silently if registration failed.
pub fn with_metrics(f: impl FnOnce(&MirrorMetrics)) {
    if !metrics_enabled() {
        return;
    }
    if let Ok(metrics) = METRICS.as_ref() {
        f(metrics);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
))]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
