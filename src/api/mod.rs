//! API Module
//!
//! HTTP handlers and routing for the gateway.
//!
//! # Endpoints
//! - `GET /` - Index page
//! - `GET /health` - Aggregated backend health
//! - `GET /metrics` - Prometheus metrics
//! - `GET|POST /api/test` - Test table records
//! - `GET|POST /api/cache`, `GET|DELETE /api/cache/:key` - Cache pass-through
//! - `GET /api/system/overview` - Record and cache statistics

pub mod handlers;
pub mod health;
pub mod routes;

pub use handlers::*;
pub use health::{health_handler, overview_handler};
pub use routes::create_router;
