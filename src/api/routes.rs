//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use std::any::Any;

use axum::{
    middleware::from_fn_with_state,
    response::Response,
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::{
    create_record_handler, delete_cache_key_handler, get_cache_value_handler, index_handler,
    list_cache_keys_handler, list_records_handler, not_found_handler, set_cache_value_handler,
    AppState,
};
use super::health::{health_handler, overview_handler};
use crate::error::internal_error_response;
use crate::limiter::{enforce_rate_limit, RouteGuard, CACHE_QUOTA, RECORD_QUOTA};
use crate::metrics::{metrics_handler, track_metrics};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Index page
/// - `GET /health` - Aggregated health check
/// - `GET /metrics` - Prometheus exposition
/// - `GET|POST /api/test` - List or create records (10 req/min)
/// - `GET|POST /api/cache` - List keys or set a value (30 req/min)
/// - `GET|DELETE /api/cache/:key` - Read or delete a key (30 req/min)
/// - `GET /api/system/overview` - Record and cache statistics
/// - `/static/*` - Static assets
///
/// # Middleware
/// - CORS: any origin, `/api` only
/// - Metrics: count and latency per matched route
/// - Tracing: Logs all requests
/// - Panics are converted into a 500 JSON error
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let record_guard = RouteGuard::new(state.limiter.clone(), RECORD_QUOTA, state.metrics.clone());
    let cache_guard = RouteGuard::new(state.limiter.clone(), CACHE_QUOTA, state.metrics.clone());

    let records = Router::new()
        .route(
            "/test",
            get(list_records_handler).post(create_record_handler),
        )
        .route_layer(from_fn_with_state(record_guard, enforce_rate_limit));

    let cache = Router::new()
        .route(
            "/cache",
            get(list_cache_keys_handler).post(set_cache_value_handler),
        )
        .route(
            "/cache/:key",
            get(get_cache_value_handler).delete(delete_cache_key_handler),
        )
        .route_layer(from_fn_with_state(cache_guard, enforce_rate_limit));

    let api = Router::new()
        .merge(records)
        .merge(cache)
        .route("/system/overview", get(overview_handler))
        .layer(cors);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api)
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .fallback(not_found_handler)
        .layer(from_fn_with_state(state.metrics.clone(), track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);
    internal_error_response()
}
