//! Cache Statistics Module
//!
//! Derives the overview's cache section from raw server statistics.

use serde::Serialize;

use crate::cache::CacheInfo;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// == Cache Summary ==
/// Cache section of the system overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheSummary {
    /// Number of keys in the selected database
    pub keys: u64,
    /// Used memory in megabytes, 2 decimals
    pub memory_mb: f64,
    /// hits / (hits + misses), 4 decimals
    pub hit_rate: f64,
}

impl CacheSummary {
    pub fn from_info(info: &CacheInfo) -> Self {
        Self {
            keys: info.key_count,
            memory_mb: memory_mb(info.used_memory_bytes),
            hit_rate: hit_rate(info.keyspace_hits, info.keyspace_misses),
        }
    }
}

/// Converts bytes to megabytes rounded to 2 decimals.
pub fn memory_mb(used_memory_bytes: u64) -> f64 {
    round_to(used_memory_bytes as f64 / BYTES_PER_MB, 2)
}

// == Hit Rate ==
/// Returns hits / (hits + misses) rounded to 4 decimals, or 0.0 when there
/// have been no lookups.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        round_to(hits as f64 / total as f64, 4)
    }
}

/// Rounds half to even, so exact ties land on the even digit.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(hit_rate(0, 0), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        assert_eq!(hit_rate(3, 0), 1.0);
    }

    #[test]
    fn test_hit_rate_all_misses() {
        assert_eq!(hit_rate(0, 2), 0.0);
    }

    #[test]
    fn test_hit_rate_rounds_to_four_decimals() {
        assert_eq!(hit_rate(1, 2), 0.3333);
        assert_eq!(hit_rate(2, 1), 0.6667);
    }

    #[test]
    fn test_hit_rate_tie_rounds_to_even() {
        // 1 / 32 = 0.03125 exactly
        assert_eq!(hit_rate(1, 31), 0.0312);
        // 3 / 32 = 0.09375 exactly
        assert_eq!(hit_rate(3, 29), 0.0938);
    }

    #[test]
    fn test_memory_mb() {
        assert_eq!(memory_mb(0), 0.0);
        assert_eq!(memory_mb(1024 * 1024), 1.0);
        assert_eq!(memory_mb(1_500_000), 1.43);
    }

    #[test]
    fn test_memory_mb_tie_rounds_to_even() {
        // 1.125 MB and 1.375 MB exactly
        assert_eq!(memory_mb(1_179_648), 1.12);
        assert_eq!(memory_mb(1_441_792), 1.38);
    }

    #[test]
    fn test_summary_from_info() {
        let info = CacheInfo {
            used_memory_bytes: 2 * 1024 * 1024,
            keyspace_hits: 80,
            keyspace_misses: 20,
            key_count: 7,
        };
        let summary = CacheSummary::from_info(&info);
        assert_eq!(summary.keys, 7);
        assert_eq!(summary.memory_mb, 2.0);
        assert_eq!(summary.hit_rate, 0.8);
    }

    #[test]
    fn test_default_summary_is_zeroed() {
        let summary = CacheSummary::default();
        assert_eq!(summary.keys, 0);
        assert_eq!(summary.memory_mb, 0.0);
        assert_eq!(summary.hit_rate, 0.0);
    }
}
