//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheSummary;
use crate::store::TestRecord;

/// Response body for GET /api/test
#[derive(Debug, Clone, Serialize)]
pub struct RecordListResponse {
    pub success: bool,
    pub data: Vec<TestRecord>,
    pub count: usize,
}

impl RecordListResponse {
    pub fn new(data: Vec<TestRecord>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Response body for GET /api/cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheKeysResponse {
    pub keys: Vec<String>,
    pub count: usize,
}

impl CacheKeysResponse {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            count: keys.len(),
            keys,
        }
    }
}

/// Response body for GET /api/cache/:key and POST /api/cache
///
/// `ttl` is `null` when the key has no expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntryResponse {
    pub key: String,
    pub value: String,
    pub ttl: Option<u64>,
}

impl CacheEntryResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: Option<u64>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }
}

/// Response body for DELETE /api/cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct CacheDeleteResponse {
    pub success: bool,
    pub key: String,
}

impl CacheDeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            success: true,
            key: key.into(),
        }
    }
}

// == Health ==
/// Reachability of one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl From<bool> for ConnectionStatus {
    fn from(reachable: bool) -> Self {
        if reachable {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always "healthy"; the HTTP status carries the verdict
    pub status: &'static str,
    pub database: ConnectionStatus,
    pub cache: ConnectionStatus,
    pub prometheus: ConnectionStatus,
    pub grafana: ConnectionStatus,
}

impl HealthResponse {
    pub fn new(database: bool, cache: bool, prometheus: bool, grafana: bool) -> Self {
        Self {
            status: "healthy",
            database: database.into(),
            cache: cache.into(),
            prometheus: prometheus.into(),
            grafana: grafana.into(),
        }
    }

    /// The database alone decides overall health.
    pub fn is_healthy(&self) -> bool {
        self.database == ConnectionStatus::Connected
    }
}

// == Overview ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatabaseSummary {
    pub total_records: i64,
}

/// Response body for GET /api/system/overview
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemOverview {
    pub database: DatabaseSummary,
    pub cache: CacheSummary,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_list_counts_rows() {
        let resp = RecordListResponse::new(Vec::new());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"success": true, "data": [], "count": 0}));
    }

    #[test]
    fn test_cache_entry_null_ttl() {
        let json = serde_json::to_value(CacheEntryResponse::new("k", "v", None)).unwrap();
        assert_eq!(json, json!({"key": "k", "value": "v", "ttl": null}));
    }

    #[test]
    fn test_delete_response_serialize() {
        let json = serde_json::to_value(CacheDeleteResponse::new("gone")).unwrap();
        assert_eq!(json, json!({"success": true, "key": "gone"}));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::new(true, false, false, true);
        assert!(resp.is_healthy());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            json!({
                "status": "healthy",
                "database": "connected",
                "cache": "disconnected",
                "prometheus": "disconnected",
                "grafana": "connected"
            })
        );
    }

    #[test]
    fn test_health_gated_on_database() {
        assert!(!HealthResponse::new(false, true, true, true).is_healthy());
    }

    #[test]
    fn test_overview_serialize() {
        let overview = SystemOverview {
            database: DatabaseSummary { total_records: 3 },
            cache: CacheSummary::default(),
        };
        let json = serde_json::to_value(overview).unwrap();
        assert_eq!(json["database"]["total_records"], 3);
        assert_eq!(json["cache"]["keys"], 0);
        assert_eq!(json["cache"]["hit_rate"], 0.0);
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
