//! In-memory record store with an availability switch for outage tests.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{RecordStore, StoreError, StoreResult, TestRecord};

#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<Vec<TestRecord>>,
    next_id: AtomicI32,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI32::new(1),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates the database going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "could not connect to server: Connection refused".to_string(),
            ))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn list_records(&self, limit: i64) -> StoreResult<Vec<TestRecord>> {
        self.check_available()?;
        let limit = usize::try_from(limit).unwrap_or(0);
        let records = self.records.read().await;
        Ok(records.iter().take(limit).cloned().collect())
    }

    async fn insert_record(&self, name: &str, value: &str) -> StoreResult<TestRecord> {
        self.check_available()?;
        let record = TestRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            value: Some(value.to_string()),
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn count_records(&self) -> StoreResult<i64> {
        self.check_available()?;
        Ok(self.records.read().await.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let first = store.insert_record("a", "").await.unwrap();
        let second = store.insert_record("b", "x").await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.value.as_deref(), Some("x"));
        assert_eq!(store.count_records().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert_record(&format!("n{i}"), "").await.unwrap();
        }
        assert_eq!(store.list_records(3).await.unwrap().len(), 3);
        assert_eq!(store.list_records(100).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(store.ping().await.is_err());
        assert!(store.insert_record("a", "").await.is_err());
        assert!(store.count_records().await.is_err());

        store.set_available(true);
        assert_eq!(store.count_records().await.unwrap(), 0);
    }
}
