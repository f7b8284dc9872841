//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction, plus the
//! cache-through helper used by the enrichment pipeline.

mod clock;
mod entry;
mod lru;
mod shared;
mod stats;
mod store;
mod through;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use lru::LruList;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::TtlCache;
pub use through::with_cache;

// == Public Constants ==
/// Default maximum number of live entries
pub const DEFAULT_MAX_SIZE: usize = 5000;

/// Default entry lifetime in seconds (one day)
pub const DEFAULT_TTL_SECONDS: u64 = 86_400;
