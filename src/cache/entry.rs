//! Cache Entry Module
//!
//! A stored value plus its optional expiry, for the in-memory backend.

use std::time::{Duration, Instant};

// == Cache Entry ==
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL in seconds.
    pub fn new(value: String, ttl_seconds: Option<u64>) -> Self {
        Self::new_at(value, ttl_seconds, Instant::now())
    }

    pub fn new_at(value: String, ttl_seconds: Option<u64>, now: Instant) -> Self {
        Self {
            value,
            expires_at: ttl_seconds.map(|ttl| now + Duration::from_secs(ttl)),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Remaining TTL in whole seconds, rounded up.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_at(&self, now: Instant) -> Option<u64> {
        self.expires_at.map(|expires| {
            let remaining = expires.saturating_duration_since(now);
            remaining.as_millis().div_ceil(1000) as u64
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("test_value".to_string(), None);

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(Instant::now()));
    }

    #[test]
    fn test_entry_expiration() {
        let start = Instant::now();
        let entry = CacheEntry::new_at("v".to_string(), Some(1), start);

        assert!(!entry.is_expired_at(start));
        assert!(!entry.is_expired_at(start + Duration::from_millis(999)));
        assert!(entry.is_expired_at(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_ttl_remaining_rounds_up() {
        let start = Instant::now();
        let entry = CacheEntry::new_at("v".to_string(), Some(5), start);

        assert_eq!(entry.ttl_remaining_at(start), Some(5));
        assert_eq!(
            entry.ttl_remaining_at(start + Duration::from_millis(4100)),
            Some(1)
        );
        assert_eq!(entry.ttl_remaining_at(start + Duration::from_secs(6)), Some(0));
    }

    #[test]
    fn test_ttl_remaining_no_expiration() {
        let entry = CacheEntry::new("test_value".to_string(), None);
        assert!(entry.ttl_remaining_at(Instant::now()).is_none());
    }
}
