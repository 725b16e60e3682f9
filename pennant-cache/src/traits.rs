//! Cache store trait definition.

use crate::error::CacheResult;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value store in front of the definition store.
///
/// Values are JSON strings. Implementations must tolerate concurrent readers;
/// concurrent writers to one key are last-write-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a JSON value from the cache.
    ///
    /// Returns `Ok(None)` if the key is absent or expired.
    async fn get_json(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a JSON value in the cache.
    ///
    /// # Arguments
    ///
    /// * `key` - The cache key
    /// * `value` - The JSON string value
    /// * `ttl` - Optional time-to-live; `None` falls back to the store's default
    async fn set_json(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()>;

    /// Delete a key from the cache. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Check if a key exists in the cache.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Clear all keys owned by this store.
    async fn clear(&self) -> CacheResult<()>;

    /// Remaining time-to-live of a key.
    ///
    /// Returns `Ok(None)` if the key has no expiration or doesn't exist.
    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>>;

    /// Set or update the expiration time for a key.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()>;

    /// Delete multiple keys concurrently.
    async fn delete_many(&self, keys: &[&str]) -> CacheResult<()> {
        use futures::future::try_join_all;

        let futures = keys.iter().map(|key| self.delete(key));
        try_join_all(futures).await?;
        Ok(())
    }
}
