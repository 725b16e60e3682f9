//! Redis cache implementation.

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;

/// Redis cache store, shared by every process pointing at the same server.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    config: CacheConfig,
}

impl RedisCache {
    /// Connect to the server named in `config`.
    ///
    /// ```no_run
    /// use pennant_cache::*;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), CacheError> {
    ///     let config = CacheConfig::redis("redis://localhost:6379")?.with_key_prefix("pennant");
    ///     let cache = RedisCache::new(config).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> CacheResult<Self> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        let connection = tokio::time::timeout(config.connection_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Connection(format!("timed out connecting to {}", config.url)))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        pennant_log::info!("connected to redis cache at {}", config.url);
        Ok(Self { connection, config })
    }

    fn build_key(&self, key: &str) -> String {
        self.config.build_key(key)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get_json(&self, key: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(&key).await?;
        Ok(value)
    }

    async fn set_json(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();

        match ttl.or(self.config.default_ttl) {
            Some(ttl) => {
                let _: () = conn.set_ex(&key, value, ttl.as_secs().max(1)).await?;
            }
            None => {
                let _: () = conn.set(&key, value).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();
        let _: () = conn.del(&key).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(&key).await?;
        Ok(exists)
    }

    /// With a key prefix only the prefixed keys are removed, otherwise the
    /// whole database is flushed.
    async fn clear(&self) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let Some(prefix) = &self.config.key_prefix else {
            let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
            return Ok(());
        };

        let pattern = format!("{}:*", prefix);
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;
            if !keys.is_empty() {
                let _: () = conn.del(keys).await?;
            }
            if next == 0 {
                return Ok(());
            }
            cursor = next;
        }
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();

        let ttl_seconds: i64 = conn.ttl(&key).await?;

        // -2: missing key, -1: no expiration
        match ttl_seconds {
            seconds if seconds > 0 => Ok(Some(Duration::from_secs(seconds as u64))),
            _ => Ok(None),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();
        let _: () = conn.expire(&key, ttl.as_secs() as i64).await?;
        Ok(())
    }
}
