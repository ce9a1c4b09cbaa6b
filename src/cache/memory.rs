//! In-Memory Cache Backend
//!
//! HashMap storage with lazy TTL expiration and hit/miss accounting. Mirrors
//! the observable behavior of the Redis backend so handlers can be exercised
//! without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;

use crate::cache::{CacheBackend, CacheEntry, CacheError, CacheInfo, CacheResult};

// == Memory Cache ==
#[derive(Debug)]
pub struct MemoryCache {
    /// Key-value storage
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    available: AtomicBool,
}

impl MemoryCache {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates the cache server going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Connection(
                "Error connecting to cache: Connection refused".to_string(),
            ))
        }
    }

    /// Drops `key` if it has expired, so reads never observe stale entries.
    async fn purge_if_expired(&self, key: &str, now: Instant) {
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired_at(now)) {
            entries.remove(key);
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn ping(&self) -> CacheResult<()> {
        self.check_available()
    }

    // == Get ==
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check_available()?;
        self.purge_if_expired(key, Instant::now()).await;

        let value = self.entries.read().await.get(key).map(|e| e.value.clone());
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(value)
    }

    // == Set ==
    /// Overwrites any existing entry and resets its TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> CacheResult<()> {
        self.check_available()?;
        let entry = CacheEntry::new(value.to_string(), ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    // == Delete ==
    async fn delete(&self, key: &str) -> CacheResult<u64> {
        self.check_available()?;
        self.purge_if_expired(key, Instant::now()).await;
        let removed = self.entries.write().await.remove(key);
        Ok(u64::from(removed.is_some()))
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>> {
        self.check_available()?;
        let now = Instant::now();
        self.purge_if_expired(key, now).await;

        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .and_then(|e| e.ttl_remaining_at(now))
            .filter(|secs| *secs > 0))
    }

    fn scan_keys(&self) -> BoxStream<'static, CacheResult<String>> {
        let check = self.check_available();
        let entries = Arc::clone(&self.entries);

        stream::once(async move {
            let keys: Vec<CacheResult<String>> = match check {
                Ok(()) => {
                    let now = Instant::now();
                    entries
                        .read()
                        .await
                        .iter()
                        .filter(|(_, entry)| !entry.is_expired_at(now))
                        .map(|(key, _)| Ok(key.clone()))
                        .collect()
                }
                Err(e) => vec![Err(e)],
            };
            stream::iter(keys)
        })
        .flatten()
        .boxed()
    }

    async fn info(&self) -> CacheResult<CacheInfo> {
        self.check_available()?;
        let now = Instant::now();
        let entries = self.entries.read().await;
        let live = entries.iter().filter(|(_, e)| !e.is_expired_at(now));

        let (key_count, used_memory_bytes) = live.fold((0u64, 0u64), |(n, bytes), (k, e)| {
            (n + 1, bytes + (k.len() + e.value.len()) as u64)
        });

        Ok(CacheInfo {
            used_memory_bytes,
            keyspace_hits: self.hits.load(Ordering::Relaxed),
            keyspace_misses: self.misses.load(Ordering::Relaxed),
            key_count,
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap().as_deref(), Some("value1"));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite() {
        let cache = MemoryCache::new();
        cache.set("key1", "value1", Some(60)).await.unwrap();
        cache.set("key1", "value2", None).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap().as_deref(), Some("value2"));
        assert_eq!(cache.ttl("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_counts_removed_keys() {
        let cache = MemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();

        assert_eq!(cache.delete("key1").await.unwrap(), 1);
        assert_eq!(cache.delete("key1").await.unwrap(), 0);
        assert_eq!(cache.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_reports_remaining_seconds() {
        let cache = MemoryCache::new();
        cache.set("short", "v", Some(5)).await.unwrap();

        let ttl = cache.ttl("short").await.unwrap().unwrap();
        assert!(ttl > 0 && ttl <= 5);
        assert_eq!(cache.ttl("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new();
        cache.set("key1", "value1", Some(1)).await.unwrap();
        assert!(cache.get("key1").await.unwrap().is_some());

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        assert_eq!(cache.get("key1").await.unwrap(), None);
        assert_eq!(cache.delete("key1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scan_keys_drains_all_keys() {
        let cache = MemoryCache::new();
        for i in 0..5 {
            cache.set(&format!("k{i}"), "v", None).await.unwrap();
        }

        let mut keys: Vec<String> = cache.scan_keys().try_collect().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["k0", "k1", "k2", "k3", "k4"]);
    }

    #[tokio::test]
    async fn test_info_tracks_hits_and_misses() {
        let cache = MemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        cache.get("key1").await.unwrap();
        cache.get("nope").await.unwrap();

        let info = cache.info().await.unwrap();
        assert_eq!(info.keyspace_hits, 1);
        assert_eq!(info.keyspace_misses, 1);
        assert_eq!(info.key_count, 1);
        assert_eq!(info.used_memory_bytes, 10);
    }

    #[tokio::test]
    async fn test_unavailable_cache_fails() {
        let cache = MemoryCache::new();
        cache.set_available(false);

        assert!(cache.ping().await.is_err());
        assert!(cache.get("k").await.is_err());
        assert!(cache.info().await.is_err());
        let scanned: CacheResult<Vec<String>> = cache.scan_keys().try_collect().await;
        assert!(scanned.is_err());
    }
}
