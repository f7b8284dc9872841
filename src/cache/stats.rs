//! Cache Statistics Module
//!
//! Occupancy and access counters reported by health endpoints.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache occupancy taken after expired entries were purged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Live entries
    pub entries: usize,
    /// Configured capacity
    pub max_size: usize,
    /// `entries / max_size` as a percentage string, e.g. `"40.0%"`
    pub utilization: String,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    pub fn new(entries: usize, max_size: usize, counters: AccessCounters) -> Self {
        Self {
            entries,
            max_size,
            utilization: format_utilization(entries, max_size),
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Access Counters ==
/// Running totals kept by the store between snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl AccessCounters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

fn format_utilization(entries: usize, max_size: usize) -> String {
    if max_size == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", entries as f64 / max_size as f64 * 100.0)
}
