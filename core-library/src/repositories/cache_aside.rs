//! Cache-aside helpers.
//!
//! The cache never fetches by itself: callers look up a key, and on a miss
//! run their own fetch and store the result. Both helpers fold any fetch
//! failure into [`AppError::Generic`] so transport errors stop here.

use crate::cache::{CachePolicy, ValueCache};
use crate::error::{AppError, Result};
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// Return the cached value for `key`, or run `fetch` and store its result.
///
/// On a miss `fetch` runs once and, if it succeeds, the value is stored once
/// under `policy`. A failed fetch stores nothing.
pub async fn handle_cached_value<K, V, C, F, Fut, E>(
    cache: &C,
    key: K,
    policy: &CachePolicy,
    fetch: F,
) -> Result<V>
where
    C: ValueCache<K, V> + ?Sized,
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<V, E>>,
    E: Display,
{
    if let Some(value) = cache.get_value(&key, policy) {
        debug!("Cache hit");
        return Ok(value);
    }

    debug!(?policy, "Cache miss, fetching");
    let value = handle_value(fetch).await?;
    cache.set_value(key, value.clone(), policy);
    Ok(value)
}

/// Run `fetch` with the same error mapping as [`handle_cached_value`], without caching.
pub async fn handle_value<V, F, Fut, E>(fetch: F) -> Result<V>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<V, E>>,
    E: Display,
{
    fetch().await.map_err(|err| {
        warn!(error = %err, "Fetch failed");
        AppError::Generic(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheService;
    use bridge_traits::BridgeError;
    use std::time::Duration;

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let cache = CacheService::<&str, u32>::new();
        let policy = CachePolicy::cache_first(Duration::from_secs(60)).unwrap();
        cache.set_value("k", 1, &policy);

        let value = handle_cached_value(&cache, "k", &policy, || async {
            Err::<u32, _>(BridgeError::Network("must not be called".into()))
        })
        .await
        .unwrap();

        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_failure_maps_to_generic_and_stores_nothing() {
        let cache = CacheService::<&str, u32>::new();
        let policy = CachePolicy::RefreshAndCache;

        let err = handle_cached_value(&cache, "k", &policy, || async {
            Err::<u32, _>(BridgeError::Network("offline".into()))
        })
        .await
        .unwrap_err();

        assert_eq!(err, AppError::Generic("Network error: offline".into()));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_handle_value_passes_success_through() {
        let value = handle_value(|| async { Ok::<_, BridgeError>("url") }).await;
        assert_eq!(value, Ok("url"));
    }
}
