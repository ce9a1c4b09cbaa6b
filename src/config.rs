//! Configuration Module
//!
//! Loads connection parameters and server settings from environment variables.

use std::env;

/// Default Postgres port.
pub const DEFAULT_DB_PORT: u16 = 5432;
/// Default secret used when `SECRET_KEY` is unset.
pub const DEFAULT_SECRET_KEY: &str = "default-key";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Python-style log level name (`INFO`, `WARNING`, ...)
    pub log_level: String,
    /// Application secret
    pub secret_key: String,
    /// Relational store connection parameters
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_host: Option<String>,
    pub db_port: u16,
    /// Key-value store location
    pub redis_host: String,
    pub redis_port: u16,
    /// HTTP server port
    pub server_port: u16,
    /// Monitoring probe targets checked by `/health`
    pub prometheus_health_url: String,
    pub grafana_health_url: String,
    /// Static asset served at `/`
    pub index_path: String,
    /// Directory served under `/static`
    pub static_dir: String,
}

/// Connection parameters for one relational store connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: u16,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LOG_LEVEL` (default: INFO)
    /// - `SECRET_KEY` (default: default-key)
    /// - `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_HOST` (default: unset)
    /// - `DB_PORT` (default: 5432)
    /// - `REDIS_HOST` (default: localhost), `REDIS_PORT` (default: 6379)
    /// - `SERVER_PORT` (default: 3000)
    /// - `PROMETHEUS_HEALTH_URL`, `GRAFANA_HEALTH_URL`
    /// - `INDEX_PATH` (default: templates/index.html), `STATIC_DIR` (default: static)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            secret_key: env::var("SECRET_KEY").unwrap_or(defaults.secret_key),
            db_name: env::var("DB_NAME").ok(),
            db_user: env::var("DB_USER").ok(),
            db_password: env::var("DB_PASSWORD").ok(),
            db_host: env::var("DB_HOST").ok(),
            db_port: parse_var("DB_PORT").unwrap_or(defaults.db_port),
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: parse_var("REDIS_PORT").unwrap_or(defaults.redis_port),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            prometheus_health_url: env::var("PROMETHEUS_HEALTH_URL")
                .unwrap_or(defaults.prometheus_health_url),
            grafana_health_url: env::var("GRAFANA_HEALTH_URL")
                .unwrap_or(defaults.grafana_health_url),
            index_path: env::var("INDEX_PATH").unwrap_or(defaults.index_path),
            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }

    /// Connection parameters for the relational store.
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            name: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }

    /// Connection URL for the key-value store.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }

    /// Tracing filter directive derived from `LOG_LEVEL`.
    pub fn log_filter(&self) -> String {
        let level = tracing_level(&self.log_level);
        format!("demo_gateway={level},tower_http={level}")
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            db_name: None,
            db_user: None,
            db_password: None,
            db_host: None,
            db_port: DEFAULT_DB_PORT,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            server_port: 3000,
            prometheus_health_url: "http://prometheus:9090/-/healthy".to_string(),
            grafana_health_url: "http://grafana:3000/api/health".to_string(),
            index_path: "templates/index.html".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Maps Python logging level names onto tracing levels.
fn tracing_level(name: &str) -> &'static str {
    match name.trim().to_ascii_uppercase().as_str() {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "WARN" | "WARNING" => "warn",
        "ERROR" | "CRITICAL" | "FATAL" => "error",
        _ => "info",
    }
}
