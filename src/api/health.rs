//! Health and overview aggregation
//!
//! Both endpoints fan out to several backends and merge the results. A failed
//! backend check only affects its own field.

use axum::{extract::State, http::StatusCode, Json};
use tracing::{debug, error};

use crate::api::AppState;
use crate::cache::CacheSummary;
use crate::error::Result;
use crate::models::{DatabaseSummary, HealthResponse, SystemOverview};

async fn database_reachable(state: &AppState) -> bool {
    match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            debug!("Database check failed: {}", e);
            false
        }
    }
}

async fn cache_reachable(state: &AppState) -> bool {
    let Some(cache) = &state.cache else {
        return false;
    };
    match cache.ping().await {
        Ok(()) => true,
        Err(e) => {
            debug!("Cache check failed: {}", e);
            false
        }
    }
}

/// Handler for GET /health
///
/// Runs the database, cache and two monitoring checks concurrently. Answers
/// 200 when the database is reachable and 503 otherwise, whatever the other
/// three report.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, cache, prometheus, grafana) = tokio::join!(
        database_reachable(&state),
        cache_reachable(&state),
        state.monitors.prometheus.check(),
        state.monitors.grafana.check(),
    );

    let health = HealthResponse::new(database, cache, prometheus, grafana);
    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}

/// Handler for GET /api/system/overview
///
/// The record count is required; cache statistics fall back to zeros when the
/// handle is absent or the read fails.
pub async fn overview_handler(State(state): State<AppState>) -> Result<Json<SystemOverview>> {
    let total_records = state.store.count_records().await?;

    let cache = match &state.cache {
        Some(cache) => match cache.info().await {
            Ok(info) => CacheSummary::from_info(&info),
            Err(e) => {
                error!("Cache metrics error: {}", e);
                CacheSummary::default()
            }
        },
        None => CacheSummary::default(),
    };

    Ok(Json(SystemOverview {
        database: DatabaseSummary { total_records },
        cache,
    }))
}
