//! Typed access on top of the JSON-string [`CacheStore`] contract.

use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::time::Duration;

/// Get a typed value from the cache.
pub async fn get<S, T>(store: &S, key: &str) -> CacheResult<Option<T>>
where
    S: CacheStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get_json(key).await? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| CacheError::Deserialization(e.to_string())),
        None => Ok(None),
    }
}

/// Set a typed value in the cache.
pub async fn set<S, T>(store: &S, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()>
where
    S: CacheStore + ?Sized,
    T: Serialize,
{
    let json = serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
    store.set_json(key, json, ttl).await
}

/// Read-through lookup.
///
/// Returns the cached value if present. Otherwise calls `fetch`; a `Some`
/// result is written back with `ttl` and returned, a `None` result is
/// returned without being cached. An entry that no longer deserializes is
/// treated as a miss and overwritten.
pub async fn read_through<S, T, E, F, Fut>(
    store: &S,
    key: &str,
    ttl: Option<Duration>,
    fetch: F,
) -> Result<Option<T>, E>
where
    S: CacheStore + ?Sized,
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    match get(store, key).await {
        Ok(Some(value)) => return Ok(Some(value)),
        Ok(None) => pennant_log::debug!("cache miss: {}", key),
        Err(CacheError::Deserialization(e)) => {
            pennant_log::warn!("discarding unreadable cache entry {}: {}", key, e);
        }
        Err(e) => return Err(e.into()),
    }

    let fetched = fetch().await?;
    if let Some(value) = &fetched {
        set(store, key, value, ttl).await?;
    }
    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryCache;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
        active: bool,
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let cache = InMemoryCache::new();
        let entry = Entry {
            name: "beta".to_string(),
            active: true,
        };
        set(&cache, "e", &entry, None).await.unwrap();
        assert_eq!(get::<_, Entry>(&cache, "e").await.unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn test_read_through_fetches_once() {
        let cache = InMemoryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Option<u32> = read_through(&cache, "n", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CacheError>(Some(7))
            })
            .await
            .unwrap();
            assert_eq!(value, Some(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_read_through_does_not_cache_absence() {
        let cache = InMemoryCache::new();
        let value: Option<u32> = read_through(&cache, "n", None, || async { Ok::<_, CacheError>(None) })
            .await
            .unwrap();
        assert_eq!(value, None);
        assert!(!cache.exists("n").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_through_replaces_unreadable_entry() {
        let cache = InMemoryCache::new();
        cache.set_json("n", "not json".to_string(), None).await.unwrap();

        let value: Option<u32> = read_through(&cache, "n", None, || async { Ok::<_, CacheError>(Some(3)) })
            .await
            .unwrap();
        assert_eq!(value, Some(3));
        assert_eq!(cache.get_json("n").await.unwrap(), Some("3".to_string()));
    }
}
