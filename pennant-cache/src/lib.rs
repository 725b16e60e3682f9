//! Cache facade for the Pennant flag engine.
//!
//! Flag, switch and sample definitions are read far more often than they
//! change, so the engine keeps JSON copies of them in a [`CacheStore`] and
//! only falls back to the definition store on a miss.
//!
//! # Features
//!
//! - `redis` - Enable the Redis backend, shared across processes
//!
//! # Examples
//!
//! ```
//! use pennant_cache::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), CacheError> {
//! let cache = InMemoryCache::new();
//! set(&cache, "switch:maintenance", &true, Some(Duration::from_secs(60))).await?;
//!
//! let active: Option<bool> = get(&cache, "switch:maintenance").await?;
//! assert_eq!(active, Some(true));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod helpers;
pub mod memory;
pub mod traits;

#[cfg(feature = "redis")]
pub mod redis_cache;

pub use config::{CacheBackend, CacheConfig};
pub use error::{CacheError, CacheResult};
pub use helpers::*;
pub use memory::InMemoryCache;
pub use traits::CacheStore;

#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;
