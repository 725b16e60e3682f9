//! Integration tests for pennant-cache

use pennant_cache::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_store_as_trait_object() {
    let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCache::new());

    set(cache.as_ref(), "flag:beta", &vec!["1", "2"], None).await.unwrap();
    let users: Option<Vec<String>> = get(cache.as_ref(), "flag:beta").await.unwrap();
    assert_eq!(users, Some(vec!["1".to_string(), "2".to_string()]));
}

#[tokio::test]
async fn test_concurrent_readers_and_writers() {
    let cache = Arc::new(InMemoryCache::new());
    let mut handles = Vec::new();

    for i in 0..16u32 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            set(cache.as_ref(), "shared", &i, None).await.unwrap();
            let seen: Option<u32> = get(cache.as_ref(), "shared").await.unwrap();
            assert!(seen.is_some());
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let last: Option<u32> = get(cache.as_ref(), "shared").await.unwrap();
    assert!(last.unwrap() < 16);
}

#[tokio::test]
async fn test_clear_removes_everything() {
    let cache = InMemoryCache::new();
    cache.set_json("a", "1".to_string(), None).await.unwrap();
    cache.set_json("b", "2".to_string(), Some(Duration::from_secs(60))).await.unwrap();

    cache.clear().await.unwrap();
    assert!(cache.is_empty().await);
}

#[test]
fn test_cache_error_display() {
    let err = CacheError::Connection("Failed to connect".to_string());
    assert!(err.to_string().contains("Failed to connect"));
}

// These tests need a running Redis server:
// cargo test -p pennant-cache --features redis -- --ignored

#[cfg(feature = "redis")]
#[tokio::test]
#[ignore]
async fn test_redis_cache_set_get() {
    let config = CacheConfig::redis("redis://localhost:6379")
        .unwrap()
        .with_key_prefix("pennant-test");
    let cache = RedisCache::new(config).await.unwrap();

    cache.set_json("k", "\"v\"".to_string(), None).await.unwrap();
    assert_eq!(cache.get_json("k").await.unwrap(), Some("\"v\"".to_string()));

    cache.clear().await.unwrap();
    assert!(!cache.exists("k").await.unwrap());
}

#[cfg(feature = "redis")]
#[tokio::test]
#[ignore]
async fn test_redis_cache_with_ttl() {
    let config = CacheConfig::redis("redis://localhost:6379")
        .unwrap()
        .with_key_prefix("pennant-test");
    let cache = RedisCache::new(config).await.unwrap();

    cache
        .set_json("ttl_key", "1".to_string(), Some(Duration::from_secs(1)))
        .await
        .unwrap();
    assert!(cache.exists("ttl_key").await.unwrap());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(cache.get_json("ttl_key").await.unwrap(), None);
}
