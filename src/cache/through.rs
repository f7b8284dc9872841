//! Cache-through helper.

use std::future::Future;

use tracing::debug;

use crate::cache::SharedCache;

/// Returns the cached value for `key`, or awaits `fetch` and caches what it
/// produced.
///
/// Only `Ok(Some(_))` results are stored. `Ok(None)` and errors pass straight
/// through so that data which was unavailable this time is looked up again on
/// the next call.
pub async fn with_cache<V, E, F, Fut>(
    cache: &SharedCache<V>,
    key: &str,
    ttl_seconds: Option<u64>,
    fetch: F,
) -> Result<Option<V>, E>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<V>, E>>,
{
    if let Some(cached) = cache.get(key).await {
        debug!(key, "cache hit");
        return Ok(Some(cached));
    }

    debug!(key, "cache miss");
    let fetched = fetch().await?;
    if let Some(value) = &fetched {
        cache.set(key, value.clone(), ttl_seconds).await;
    }
    Ok(fetched)
}
