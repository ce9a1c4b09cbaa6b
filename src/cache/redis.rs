//! Redis Cache Backend
//!
//! Uses `redis::aio::ConnectionManager` for a multiplexed connection that
//! reconnects on its own once established.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use redis::aio::ConnectionManager;
use redis::{InfoDict, RedisError};
use tracing::debug;

use crate::cache::{CacheBackend, CacheError, CacheInfo, CacheResult};

/// Keys requested per SCAN round trip
const SCAN_BATCH: u64 = 100;

/// Redis-backed cache handle.
#[derive(Clone)]
pub struct RedisCache {
    connection_manager: ConnectionManager,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisCache {
    /// Opens the shared handle. Called once at startup.
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            CacheError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let connection_manager = ConnectionManager::new(client)
            .await
            .map_err(|e| {
                CacheError::Connection(format!("Failed to connect to Redis: {}", e))
            })?;

        debug!(url = url, "Redis cache connected");
        Ok(Self { connection_manager })
    }
}

fn backend(op: &'static str) -> impl Fn(RedisError) -> CacheError {
    move |e| CacheError::Backend(format!("Redis {} failed: {}", op, e))
}

/// Redis reports -2 for missing keys and -1 for keys without expiry.
fn positive_ttl(raw: i64) -> Option<u64> {
    u64::try_from(raw).ok().filter(|secs| *secs > 0)
}

fn parse_info(info: &InfoDict, key_count: u64) -> CacheInfo {
    CacheInfo {
        used_memory_bytes: info.get("used_memory").unwrap_or(0),
        keyspace_hits: info.get("keyspace_hits").unwrap_or(0),
        keyspace_misses: info.get("keyspace_misses").unwrap_or(0),
        key_count,
    }
}

struct ScanState {
    conn: ConnectionManager,
    cursor: u64,
    buffered: VecDeque<String>,
    exhausted: bool,
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(backend("PING"))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(backend("GET"))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        let cmd = match ttl {
            Some(seconds) => {
                let mut cmd = redis::cmd("SETEX");
                cmd.arg(key).arg(seconds).arg(value);
                cmd
            }
            None => {
                let mut cmd = redis::cmd("SET");
                cmd.arg(key).arg(value);
                cmd
            }
        };

        let _: () = cmd.query_async(&mut conn).await.map_err(backend("SET"))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.connection_manager.clone();
        let deleted: u64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(backend("DEL"))?;
        Ok(deleted)
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>> {
        let mut conn = self.connection_manager.clone();
        let raw: i64 = redis::cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(backend("TTL"))?;
        Ok(positive_ttl(raw))
    }

    fn scan_keys(&self) -> BoxStream<'static, CacheResult<String>> {
        let state = ScanState {
            conn: self.connection_manager.clone(),
            cursor: 0,
            buffered: VecDeque::new(),
            exhausted: false,
        };

        stream::try_unfold(state, |mut state| async move {
            loop {
                if let Some(key) = state.buffered.pop_front() {
                    return Ok::<_, CacheError>(Some((key, state)));
                }
                if state.exhausted {
                    return Ok(None);
                }

                let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(state.cursor)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut state.conn)
                    .await
                    .map_err(backend("SCAN"))?;

                state.cursor = next_cursor;
                state.exhausted = next_cursor == 0;
                state.buffered.extend(keys);
            }
        })
        .boxed()
    }

    async fn info(&self) -> CacheResult<CacheInfo> {
        let mut conn = self.connection_manager.clone();
        let info: InfoDict = redis::cmd("INFO")
            .query_async(&mut conn)
            .await
            .map_err(backend("INFO"))?;
        let key_count: u64 = redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(backend("DBSIZE"))?;

        Ok(parse_info(&info, key_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_ttl() {
        assert_eq!(positive_ttl(-2), None);
        assert_eq!(positive_ttl(-1), None);
        assert_eq!(positive_ttl(0), None);
        assert_eq!(positive_ttl(42), Some(42));
    }

    #[test]
    fn test_parse_info() {
        let raw = concat!(
            "# Memory\r\nused_memory:2097152\r\n",
            "# Stats\r\nkeyspace_hits:30\r\nkeyspace_misses:10\r\n",
        );
        let info = parse_info(&InfoDict::new(raw), 12);

        assert_eq!(info.used_memory_bytes, 2_097_152);
        assert_eq!(info.keyspace_hits, 30);
        assert_eq!(info.keyspace_misses, 10);
        assert_eq!(info.key_count, 12);
    }

    #[test]
    fn test_parse_info_missing_fields_default_to_zero() {
        let info = parse_info(&InfoDict::new("# Server\r\nredis_version:7.2.0\r\n"), 0);
        assert_eq!(info, CacheInfo::default());
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = RedisCache::connect("not-a-url").await;
        assert!(matches!(result, Err(CacheError::Connection(_))));
    }
}
