//! In-process cache store.

use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::traits::CacheStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// In-memory cache with per-entry expiry.
///
/// Expired entries are invisible to readers and are dropped on the next
/// write to the same key or by [`InMemoryCache::purge_expired`].
#[derive(Clone)]
pub struct InMemoryCache {
    data: Arc<RwLock<HashMap<String, CacheEntry>>>,
    config: CacheConfig,
}

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|exp| exp > now)
    }
}

impl InMemoryCache {
    /// Create new in-memory cache
    pub fn new() -> Self {
        Self::with_config(CacheConfig::memory())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut data = self.data.write().await;
        let before = data.len();
        let now = Instant::now();
        data.retain(|_, entry| entry.is_live(now));
        before - data.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get_json(&self, key: &str) -> CacheResult<Option<String>> {
        let key = self.config.build_key(key);
        let data = self.data.read().await;
        Ok(data
            .get(&key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone()))
    }

    async fn set_json(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        let key = self.config.build_key(key);
        let expires_at = ttl.or(self.config.default_ttl).map(|d| Instant::now() + d);
        self.data
            .write()
            .await
            .insert(key, CacheEntry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let key = self.config.build_key(key);
        self.data.write().await.remove(&key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.get_json(key).await.map(|v| v.is_some())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.data.write().await.clear();
        Ok(())
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>> {
        let key = self.config.build_key(key);
        let data = self.data.read().await;
        let now = Instant::now();
        Ok(data
            .get(&key)
            .and_then(|entry| entry.expires_at)
            .filter(|exp| *exp > now)
            .map(|exp| exp - now))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()> {
        let key = self.config.build_key(key);
        let mut data = self.data.write().await;
        if let Some(entry) = data.get_mut(&key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemoryCache::new();

        cache.set_json("flag:beta", "{}".to_string(), None).await.unwrap();
        assert_eq!(cache.get_json("flag:beta").await.unwrap(), Some("{}".to_string()));
        assert!(cache.exists("flag:beta").await.unwrap());

        cache.delete("flag:beta").await.unwrap();
        assert_eq!(cache.get_json("flag:beta").await.unwrap(), None);
        cache.delete("flag:beta").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = InMemoryCache::new();
        cache
            .set_json("k", "v".to_string(), Some(Duration::from_secs(10)))
            .await
            .unwrap();

        assert_eq!(cache.ttl("k").await.unwrap(), Some(Duration::from_secs(10)));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get_json("k").await.unwrap(), None);
        assert_eq!(cache.ttl("k").await.unwrap(), None);

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_ttl_applies() {
        let cache = InMemoryCache::with_config(
            CacheConfig::memory().with_default_ttl(Duration::from_secs(5)),
        );
        cache.set_json("k", "v".to_string(), None).await.unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_updates_deadline() {
        let cache = InMemoryCache::new();
        cache.set_json("k", "v".to_string(), None).await.unwrap();
        assert_eq!(cache.ttl("k").await.unwrap(), None);

        cache.expire("k", Duration::from_secs(3)).await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = InMemoryCache::with_config(CacheConfig::memory().with_key_prefix("a"));
        cache.set_json("k", "1".to_string(), None).await.unwrap();

        let clone = cache.clone();
        assert_eq!(clone.get_json("k").await.unwrap(), Some("1".to_string()));

        clone.delete_many(&["k", "missing"]).await.unwrap();
        assert!(!cache.exists("k").await.unwrap());
    }
}
