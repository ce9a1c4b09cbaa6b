//! Cache Module
//!
//! Pass-through access to an external key-value store. The handle is optional
//! in `AppState`; an absent handle turns every cache endpoint into a 503.

mod entry;
mod memory;
mod redis;
mod stats;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

pub use entry::CacheEntry;
pub use memory::MemoryCache;
pub use self::redis::RedisCache;
pub use stats::CacheSummary;

// == Cache Error ==
/// Errors raised by cache backends.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to reach the cache backend
    #[error("Cache connection error: {0}")]
    Connection(String),

    /// A command was rejected or failed mid-flight
    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

// == Cache Info ==
/// Raw server statistics used by the overview endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheInfo {
    pub used_memory_bytes: u64,
    pub keyspace_hits: u64,
    pub keyspace_misses: u64,
    pub key_count: u64,
}

// == Cache Backend Trait ==
/// Operations exposed by a connected cache handle.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn ping(&self) -> CacheResult<()>;

    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value`, expiring after `ttl` seconds when given.
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> CacheResult<()>;

    /// Returns the number of keys removed.
    async fn delete(&self, key: &str) -> CacheResult<u64>;

    /// Remaining lifetime in seconds; `None` for missing keys and keys without expiry.
    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>>;

    /// Lazily walks every key with a cursor. The stream cannot be restarted.
    fn scan_keys(&self) -> BoxStream<'static, CacheResult<String>>;

    async fn info(&self) -> CacheResult<CacheInfo>;
}
