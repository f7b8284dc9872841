//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::cache::stats::AccessCounters;
use crate::cache::{CacheStats, Clock, LruList, SystemClock};

// == Slot ==
#[derive(Debug)]
struct Slot<V> {
    entry: CacheEntry<V>,
    /// Position in the recency list
    node: usize,
}

// == TTL Cache ==
/// Bounded key/value store with lazy TTL expiry and LRU eviction.
///
/// All operations take `&mut self`; wrap the store in a
/// [`SharedCache`](crate::cache::SharedCache) to share it between tasks.
#[derive(Debug)]
pub struct TtlCache<V> {
    /// Key-value storage
    entries: HashMap<String, Slot<V>>,
    /// Recency order, head is the eviction candidate
    lru: LruList,
    /// Access counters
    counters: AccessCounters,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Default TTL in seconds for entries without explicit TTL
    default_ttl: u64,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates a store with the given capacity and default TTL, reading the
    /// system clock.
    pub fn new(max_size: usize, default_ttl: u64) -> Self {
        Self::with_clock(max_size, default_ttl, Arc::new(SystemClock))
    }

    /// Creates a store that reads time from `clock`.
    pub fn with_clock(max_size: usize, default_ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruList::new(),
            counters: AccessCounters::default(),
            max_size,
            default_ttl,
            clock,
        }
    }

    // == Get ==
    /// Returns the value if present and unexpired, marking it most recently
    /// used. Expired entries are removed on the spot.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        let Some(slot) = self.entries.get(key) else {
            self.counters.record_miss();
            return None;
        };

        if slot.entry.is_expired(now) {
            self.remove_entry(key);
            self.counters.record_miss();
            return None;
        }

        let (value, node) = (slot.entry.value.clone(), slot.node);
        self.lru.move_to_back(node);
        self.counters.record_hit();
        Some(value)
    }

    // == Set ==
    /// Stores a value, replacing any existing one under the same key.
    ///
    /// A new key arriving while the store is full evicts the least recently
    /// used entry first. Overwrites refresh value, expiry and recency without
    /// evicting anything.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        let key = key.into();
        let now = self.clock.now_ms();
        let entry = CacheEntry::new(value, now, ttl.unwrap_or(self.default_ttl));

        if let Some(slot) = self.entries.get_mut(&key) {
            slot.entry = entry;
            self.lru.move_to_back(slot.node);
            return;
        }

        if self.max_size == 0 {
            debug!(key = %key, "cache has zero capacity, value not stored");
            return;
        }

        if self.entries.len() >= self.max_size {
            if let Some(evicted) = self.lru.pop_front() {
                self.entries.remove(&evicted);
                self.counters.record_eviction();
                debug!(key = %evicted, "evicted least recently used entry");
            }
        }

        let node = self.lru.push_back(key.clone());
        self.entries.insert(key, Slot { entry, node });
    }

    // == Has ==
    /// Same as `get(key).is_some()`, including its expiry and recency effects.
    pub fn has(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // == Delete ==
    /// Removes an entry. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Stats ==
    /// Purges expired entries, then reports live occupancy.
    pub fn stats(&mut self) -> CacheStats {
        self.purge_expired();
        CacheStats::new(self.entries.len(), self.max_size, self.counters)
    }

    // == Purge Expired ==
    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, slot)| slot.entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        expired.len()
    }

    // == Length ==
    /// Purges expired entries, then returns the live count.
    pub fn len(&mut self) -> usize {
        self.purge_expired();
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Keys from least to most recently used.
    pub fn recency_order(&self) -> Vec<String> {
        self.lru.keys().into_iter().map(str::to_owned).collect()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(slot) => {
                self.lru.remove(slot.node);
                true
            }
            None => false,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::time::Duration;

    fn store_with_clock(max_size: usize, ttl: u64) -> (TtlCache<i32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        (TtlCache::with_clock(max_size, ttl, clock.clone()), clock)
    }

    #[test]
    fn test_store_new() {
        let mut store: TtlCache<String> = TtlCache::new(100, 300);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.max_size(), 100);
        assert_eq!(store.default_ttl(), 300);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = TtlCache::new(100, 300);

        store.set("key1", "value1".to_string(), None);

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: TtlCache<String> = TtlCache::new(100, 300);
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_delete() {
        let mut store = TtlCache::new(100, 300);

        store.set("key1", 1, None);
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
        assert!(!store.delete("key1"));
    }

    #[test]
    fn test_store_overwrite_does_not_grow_or_evict() {
        let mut store = TtlCache::new(2, 300);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.set("a", 10, None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a"), Some(10));
        assert_eq!(store.get("b"), Some(2));
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_ttl_expiration_is_lazy() {
        let (mut store, clock) = store_with_clock(100, 60);

        store.set("key1", 1, None);
        assert_eq!(store.get("key1"), Some(1));

        clock.advance(Duration::from_secs(61));

        assert_eq!(store.get("key1"), None);
        // The expired entry was removed, not just hidden
        assert!(store.recency_order().is_empty());
    }

    #[test]
    fn test_store_explicit_ttl_overrides_default() {
        let (mut store, clock) = store_with_clock(100, 3600);

        store.set("short", 1, Some(5));
        store.set("long", 2, None);

        clock.advance(Duration::from_secs(10));

        assert!(!store.has("short"));
        assert!(store.has("long"));
    }

    #[test]
    fn test_store_overwrite_refreshes_expiry() {
        let (mut store, clock) = store_with_clock(100, 10);

        store.set("k", 1, None);
        clock.advance(Duration::from_secs(8));
        store.set("k", 2, None);
        clock.advance(Duration::from_secs(8));

        assert_eq!(store.get("k"), Some(2));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = TtlCache::new(3, 300);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.set("c", 3, None);

        // Cache is full, adding d should evict a (oldest)
        store.set("d", 4, None);

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), Some(2));
        assert_eq!(store.get("d"), Some(4));
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = TtlCache::new(3, 300);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.set("c", 3, None);

        // Access a to make it most recently used
        store.get("a");

        // Adding d should evict b (now oldest)
        store.set("d", 4, None);

        assert_eq!(store.get("a"), Some(1));
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn test_store_has_refreshes_recency() {
        let mut store = TtlCache::new(2, 300);

        store.set("a", 1, None);
        store.set("b", 2, None);
        assert!(store.has("a"));

        store.set("c", 3, None);

        assert_eq!(store.recency_order(), vec!["a", "c"]);
    }

    #[test]
    fn test_store_overwrite_refreshes_recency() {
        let mut store = TtlCache::new(2, 300);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.set("a", 3, None);
        store.set("c", 4, None);

        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("a"), Some(3));
    }

    #[test]
    fn test_store_zero_capacity_stores_nothing() {
        let mut store = TtlCache::new(0, 300);

        store.set("a", 1, None);

        assert_eq!(store.get("a"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_stats_purges_expired() {
        let (mut store, clock) = store_with_clock(5, 300);

        store.set("short", 1, Some(1));
        store.set("long", 2, Some(100));
        clock.advance(Duration::from_secs(2));

        let stats = store.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.max_size, 5);
        assert_eq!(stats.utilization, "20.0%");
    }

    #[test]
    fn test_store_counters() {
        let mut store = TtlCache::new(1, 300);

        store.set("key1", 1, None);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss
        store.set("key2", 2, None); // evicts key1

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_store_purge_expired() {
        let (mut store, clock) = store_with_clock(100, 300);

        store.set("key1", 1, Some(1));
        store.set("key2", 2, Some(10));
        clock.advance(Duration::from_millis(1_100));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("key2"), Some(2));
    }

    #[test]
    fn test_store_clear() {
        let mut store = TtlCache::new(10, 300);

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.clear();

        assert!(store.is_empty());
        assert!(store.recency_order().is_empty());
    }

    #[test]
    fn test_store_eviction_ignores_key_order() {
        let mut store = TtlCache::new(2, 300);

        store.set("zzz", 1, None);
        store.set("aaa", 2, None);
        store.set("mmm", 3, None);

        // FIFO among untouched entries, not alphabetical
        assert_eq!(store.get("zzz"), None);
        assert!(store.has("aaa"));
    }
}
