//! Request and Response models for the gateway API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CacheWrite, CreateRecordRequest, NewRecord, SetCacheRequest};
pub use responses::{
    CacheDeleteResponse, CacheEntryResponse, CacheKeysResponse, ConnectionStatus,
    DatabaseSummary, ErrorResponse, HealthResponse, RecordListResponse, SystemOverview,
};
