//! Mirror Telemetry - Observability Infrastructure
//!
//! Structured logging via `tracing` and Prometheus metrics for the API layer.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{
    metrics_enabled, metrics_handler, set_metrics_enabled, with_metrics, MirrorMetrics, METRICS,
};
pub use middleware::{normalize_path, observability_middleware, REQUEST_ID_HEADER};
pub use tracer::{init_tracer, LogFormat, TelemetryConfig, DEFAULT_LOG_FILTER};
