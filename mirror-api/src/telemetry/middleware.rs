//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every request in an `http_request` span, stamps an `x-request-id`
//! and records Prometheus metrics on completion.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use mirror_core::ObjectId;
use std::time::Instant;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::metrics::with_metrics;

/// Header carrying the per-request correlation id.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Normalize path for metrics/spans (replace identifiers with placeholders).
///
/// This prevents high-cardinality label explosion in Prometheus.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_numeric = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
            if is_numeric || ObjectId::parse(segment).is_ok() || Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Observability middleware for Axum.
pub async fn observability_middleware(mut request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let request_id = match request.headers().get(&REQUEST_ID_HEADER) {
        Some(existing) => existing.clone(),
        None => {
            let generated = HeaderValue::from_str(&Uuid::now_v7().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), generated.clone());
            generated
        }
    };

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
        request_id = request_id.to_str().unwrap_or_default(),
        user_id = tracing::field::Empty,
    );

    let mut response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();
    with_metrics(|m| {
        m.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        )
    });

    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), request_id);

    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_object_id() {
        let path = "/environment/507f1f77bcf86cd799439011";
        assert_eq!(normalize_path(path), "/environment/{id}");
    }

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/spaces/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/spaces/{id}");
    }

    #[test]
    fn test_normalize_path_numeric_id() {
        assert_eq!(normalize_path("/items/12345"), "/items/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/space/search"), "/space/search");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }
}
