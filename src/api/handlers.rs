//! API Handlers
//!
//! HTTP request handlers for the record, cache and index endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use futures::TryStreamExt;
use tracing::{error, info, warn};

use crate::cache::{CacheBackend, RedisCache};
use crate::config::Config;
use crate::error::{AppError, Result, StartupError};
use crate::limiter::RateLimiter;
use crate::metrics::HttpMetrics;
use crate::models::{
    CacheDeleteResponse, CacheEntryResponse, CacheKeysResponse, CreateRecordRequest,
    RecordListResponse, SetCacheRequest,
};
use crate::probe::Monitors;
use crate::store::{PgStore, RecordStore, TestRecord, LIST_LIMIT};

/// Application state shared across all handlers.
///
/// Built once at startup. The cache handle is `None` when it could not be
/// initialized; cache endpoints then answer 503.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub cache: Option<Arc<dyn CacheBackend>>,
    pub monitors: Monitors,
    pub limiter: Arc<RateLimiter>,
    pub metrics: Arc<HttpMetrics>,
    pub index_path: PathBuf,
    pub static_dir: PathBuf,
}

impl AppState {
    /// Creates a new AppState around the given backends.
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Option<Arc<dyn CacheBackend>>,
        monitors: Monitors,
    ) -> std::result::Result<Self, StartupError> {
        let defaults = Config::default();
        Ok(Self {
            store,
            cache,
            monitors,
            limiter: Arc::new(RateLimiter::new()),
            metrics: Arc::new(HttpMetrics::new()?),
            index_path: defaults.index_path.into(),
            static_dir: defaults.static_dir.into(),
        })
    }

    pub fn with_assets(
        mut self,
        index_path: impl Into<PathBuf>,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        self.index_path = index_path.into();
        self.static_dir = static_dir.into();
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Connects the cache handle once; a failure is logged and leaves the
    /// handle absent instead of aborting startup.
    pub async fn from_config(config: &Config) -> std::result::Result<Self, StartupError> {
        let store: Arc<dyn RecordStore> = Arc::new(PgStore::new(config.database()));

        let cache: Option<Arc<dyn CacheBackend>> =
            match RedisCache::connect(&config.redis_url()).await {
                Ok(cache) => {
                    info!(
                        "Redis connected at {}:{}",
                        config.redis_host, config.redis_port
                    );
                    Some(Arc::new(cache))
                }
                Err(e) => {
                    warn!("Redis connection failed: {}", e);
                    None
                }
            };

        let monitors = Monitors::new(&config.prometheus_health_url, &config.grafana_health_url)?;

        let state = Self::new(store, cache, monitors)?;
        Ok(state.with_assets(&config.index_path, &config.static_dir))
    }

    fn require_cache(&self) -> Result<&Arc<dyn CacheBackend>> {
        self.cache
            .as_ref()
            .ok_or_else(|| AppError::Unavailable("Cache not available".to_string()))
    }
}

fn body_error(rejection: JsonRejection) -> AppError {
    AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
}

/// Handler for GET /
///
/// Serves the index page from disk on every request.
pub async fn index_handler(State(state): State<AppState>) -> Result<Html<String>> {
    match tokio::fs::read_to_string(&state.index_path).await {
        Ok(body) => Ok(Html(body)),
        Err(e) => {
            error!("Error loading {}: {}", state.index_path.display(), e);
            Err(AppError::NotFound("Not found".to_string()))
        }
    }
}

/// Handler for GET /api/test
///
/// Returns at most `LIST_LIMIT` records.
pub async fn list_records_handler(
    State(state): State<AppState>,
) -> Result<Json<RecordListResponse>> {
    let data = state.store.list_records(LIST_LIMIT).await?;
    Ok(Json(RecordListResponse::new(data)))
}

/// Handler for POST /api/test
pub async fn create_record_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TestRecord>)> {
    let Json(req) = payload.map_err(body_error)?;
    let record = req.normalize().map_err(AppError::Validation)?;

    let created = state.store.insert_record(&record.name, &record.value).await?;
    info!("Created record: {}", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for GET /api/cache
///
/// Drains the key scan into one list.
pub async fn list_cache_keys_handler(
    State(state): State<AppState>,
) -> Result<Json<CacheKeysResponse>> {
    let cache = state.require_cache()?;
    let keys: Vec<String> = cache.scan_keys().try_collect().await?;
    Ok(Json(CacheKeysResponse::new(keys)))
}

/// Handler for GET /api/cache/:key
pub async fn get_cache_value_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CacheEntryResponse>> {
    let cache = state.require_cache()?;
    let value = cache
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Key not found".to_string()))?;
    let ttl = cache.ttl(&key).await?;

    Ok(Json(CacheEntryResponse::new(key, value, ttl)))
}

/// Handler for POST /api/cache
///
/// Stores a key-value pair with optional TTL.
pub async fn set_cache_value_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SetCacheRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CacheEntryResponse>)> {
    let cache = state.require_cache()?;
    let Json(req) = payload.map_err(body_error)?;
    let write = req.normalize().map_err(AppError::Validation)?;

    cache.set(&write.key, &write.value, write.ttl).await?;
    info!("Cache set: {}", write.key);

    Ok((
        StatusCode::CREATED,
        Json(CacheEntryResponse::new(write.key, write.value, write.ttl)),
    ))
}

/// Handler for DELETE /api/cache/:key
pub async fn delete_cache_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CacheDeleteResponse>> {
    let cache = state.require_cache()?;
    if cache.delete(&key).await? == 0 {
        return Err(AppError::NotFound("Key not found".to_string()));
    }

    info!("Cache deleted: {}", key);
    Ok(Json(CacheDeleteResponse::new(key)))
}

/// Fallback for unmatched routes.
pub async fn not_found_handler() -> AppError {
    AppError::NotFound("Not found".to_string())
}
