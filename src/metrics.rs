//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency by method, route, status
//! - `http_requests_rate_limited_total` (counter): 429 rejections by route

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::api::AppState;
use crate::error::AppError;

const REQUEST_LABELS: &[&str] = &["method", "path", "status"];

/// Prometheus registry plus the HTTP metrics recorded for every request.
#[derive(Clone)]
pub struct HttpMetrics {
    registry: Registry,
    requests: IntCounterVec,
    duration: HistogramVec,
    rate_limited: IntCounterVec,
}

impl HttpMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            REQUEST_LABELS,
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            REQUEST_LABELS,
        )?;
        let rate_limited = IntCounterVec::new(
            Opts::new(
                "http_requests_rate_limited_total",
                "Requests rejected by the rate limiter",
            ),
            &["path"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(rate_limited.clone()))?;

        Ok(Self {
            registry,
            requests,
            duration,
            rate_limited,
        })
    }

    pub fn observe(&self, method: &str, path: &str, status: u16, seconds: f64) {
        let status = status.to_string();
        let labels = [method, path, status.as_str()];
        self.requests.with_label_values(&labels[..]).inc();
        self.duration.with_label_values(&labels[..]).observe(seconds);
    }

    pub fn record_rate_limited(&self, path: &str) {
        self.rate_limited.with_label_values(&[path][..]).inc();
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

/// Records count and latency for every routed request.
pub async fn track_metrics(
    State(metrics): State<Arc<HttpMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    // Unmatched paths share one label to bound cardinality
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    metrics.observe(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

/// Handler for GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            AppError::Internal.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_observed_requests() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.observe("GET", "/api/test", 200, 0.012);
        metrics.observe("GET", "/api/test", 200, 0.020);
        metrics.record_rate_limited("/api/test");

        let text = metrics.render().unwrap();
        assert!(text.contains(
            r#"http_requests_total{method="GET",path="/api/test",status="200"} 2"#
        ));
        assert!(text.contains("http_request_duration_seconds_bucket"));
        assert!(text.contains(r#"http_requests_rate_limited_total{path="/api/test"} 1"#));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = HttpMetrics::new().unwrap();
        let b = HttpMetrics::new().unwrap();
        a.observe("GET", "/health", 200, 0.001);

        assert!(!b.render().unwrap().contains("/health"));
    }
}
