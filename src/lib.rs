//! Demo Gateway - an HTTP front for a relational table and a key-value cache
//!
//! Exposes record CRUD, a cache pass-through, aggregated health and Prometheus
//! metrics, with per-client rate limits on the data endpoints.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod metrics;
pub mod models;
pub mod probe;
pub mod store;


pub use api::{create_router, AppState};
pub use config::Config;
