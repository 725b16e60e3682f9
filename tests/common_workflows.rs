//! Integration tests for common Pennant workflows.
//!
//! These tests wire settings, cache and store together the way an
//! application would.

use async_trait::async_trait;
use pennant::pennant_cache::{CacheError, CacheResult};
use pennant::prelude::*;
use pennant::{StoreError, StoreResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn service(settings: SettingsResolver, cache: InMemoryCache, store: MemoryStore) -> FlagService {
    FlagService::new(settings, Arc::new(cache), Arc::new(store))
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_settings_file_drives_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pennant.toml");
    std::fs::write(
        &path,
        "FLAG_DEFAULT = true\nCACHE_PREFIX = \"shop:\"\nCOOKIE = \"rollout_%s\"\n",
    )
    .unwrap();

    let settings = SettingsBuilder::new()
        .add_file(path.to_str().unwrap(), pennant::pennant_config::FileFormat::Toml)
        .build()
        .unwrap();

    let store = MemoryStore::new();
    store
        .upsert_flag(FlagDefinition::new("checkout").with_percent(Percent::HUNDRED))
        .await;
    let cache = InMemoryCache::new();
    let flags = service(settings, cache.clone(), store);

    let request = RequestInfo::new();
    let mut ctx = RequestFlagContext::new();
    assert!(flags.flag_is_active(&request, &mut ctx, "undefined").await.unwrap());
    assert!(flags.flag_is_active(&request, &mut ctx, "checkout").await.unwrap());

    assert!(cache.exists("shop:flag:checkout").await.unwrap());
    let cookies = ctx.cookies(&flags.settings().snapshot());
    assert_eq!(cookies[0].name, "rollout_checkout");
}

#[tokio::test]
async fn test_runtime_settings_change() {
    let settings = SettingsBuilder::new().set("SAMPLE_DEFAULT", "false").build().unwrap();
    let flags = service(settings.clone(), InMemoryCache::new(), MemoryStore::new());

    assert!(!flags.sample_is_active("missing").await.unwrap());
    settings.update(|settings| settings.sample_default = true);
    assert!(flags.sample_is_active("missing").await.unwrap());
}

// =============================================================================
// Cache behavior
// =============================================================================

#[tokio::test]
async fn test_cached_definition_survives_store_change() {
    let store = MemoryStore::new();
    store
        .upsert_flag(FlagDefinition::new("beta").with_everyone(Some(true)))
        .await;
    let flags = service(SettingsResolver::default(), InMemoryCache::new(), store.clone());
    let user = UserInfo::new("1");

    assert!(flags.flag_is_active_for_user(&user, "beta").await.unwrap());

    store
        .upsert_flag(FlagDefinition::new("beta").with_everyone(Some(false)))
        .await;
    assert!(flags.flag_is_active_for_user(&user, "beta").await.unwrap());

    flags.uncache_flag("beta").await.unwrap();
    assert!(!flags.flag_is_active_for_user(&user, "beta").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_cache_ttl_expires_definitions() {
    let settings = SettingsBuilder::new().set("CACHE_TTL", "60").build().unwrap();
    let store = MemoryStore::new();
    store.upsert_switch(SwitchDefinition::new("maintenance", true)).await;
    let flags = service(settings, InMemoryCache::new(), store.clone());

    assert!(flags.switch_is_active("maintenance").await.unwrap());
    store.upsert_switch(SwitchDefinition::new("maintenance", false)).await;

    tokio::time::advance(Duration::from_secs(30)).await;
    assert!(flags.switch_is_active("maintenance").await.unwrap());

    tokio::time::advance(Duration::from_secs(31)).await;
    assert!(!flags.switch_is_active("maintenance").await.unwrap());
}

#[tokio::test]
async fn test_unreadable_cache_entry_is_replaced() {
    let store = MemoryStore::new();
    store.upsert_switch(SwitchDefinition::new("maintenance", true)).await;
    let cache = InMemoryCache::new();
    cache
        .set_json("pennant:switch:maintenance", "not json".to_string(), None)
        .await
        .unwrap();
    let flags = service(SettingsResolver::default(), cache.clone(), store);

    assert!(flags.switch_is_active("maintenance").await.unwrap());
    let json = cache.get_json("pennant:switch:maintenance").await.unwrap().unwrap();
    assert!(json.contains("\"active\":true"));
}

// =============================================================================
// Failures
// =============================================================================

struct DownStore;

#[async_trait]
impl DefinitionStore for DownStore {
    async fn get_flag(&self, _name: &str) -> StoreResult<Option<FlagDefinition>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get_switch(&self, _name: &str) -> StoreResult<Option<SwitchDefinition>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get_sample(&self, _name: &str) -> StoreResult<Option<SampleDefinition>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn flag_users(&self, _name: &str) -> StoreResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn flag_groups(&self, _name: &str) -> StoreResult<Vec<String>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let flags = FlagService::new(
        SettingsResolver::default(),
        Arc::new(InMemoryCache::new()),
        Arc::new(DownStore),
    );

    let err = flags.switch_is_active("maintenance").await.unwrap_err();
    assert!(matches!(err, FlagError::Store(StoreError::Unavailable(_))));
    assert!(err.to_string().contains("connection refused"));

    let request = RequestInfo::new();
    let mut ctx = RequestFlagContext::new();
    assert!(flags.flag_is_active(&request, &mut ctx, "beta").await.is_err());
}

/// Cache that refuses every write and counts reads.
#[derive(Default)]
struct ReadOnlyCache {
    reads: AtomicUsize,
}

#[async_trait]
impl CacheStore for ReadOnlyCache {
    async fn get_json(&self, _key: &str) -> CacheResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> CacheResult<()> {
        Err(CacheError::Connection("read-only replica".to_string()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        Ok(false)
    }

    async fn clear(&self) -> CacheResult<()> {
        Ok(())
    }

    async fn ttl(&self, _key: &str) -> CacheResult<Option<Duration>> {
        Ok(None)
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_cache_failure_propagates() {
    let cache = Arc::new(ReadOnlyCache::default());
    let store = MemoryStore::new();
    store.upsert_switch(SwitchDefinition::new("maintenance", true)).await;
    let flags = FlagService::new(SettingsResolver::default(), cache.clone(), Arc::new(store));

    let err = flags.switch_is_active("maintenance").await.unwrap_err();
    assert!(matches!(err, FlagError::Cache(CacheError::Connection(_))));
    assert_eq!(cache.reads.load(Ordering::SeqCst), 1);

    // Absent definitions are never written, so nothing fails.
    assert!(!flags.switch_is_active("missing").await.unwrap());
}

// =============================================================================
// Request lifecycle
// =============================================================================

#[tokio::test]
async fn test_request_lifecycle() {
    let store = MemoryStore::new();
    store
        .upsert_flag(
            FlagDefinition::new("new-search")
                .with_percent(Percent::whole(30).unwrap())
                .with_rollout(true),
        )
        .await;
    store
        .upsert_flag(FlagDefinition::new("staff-tools").with_staff(true))
        .await;
    let flags = service(SettingsResolver::default(), InMemoryCache::new(), store);

    let staff = UserInfo::new("9").with_staff(true);
    let request = RequestInfo::new().with_user(staff);
    let mut ctx = RequestFlagContext::new();

    let search = flags.flag_is_active(&request, &mut ctx, "new-search").await.unwrap();
    assert!(flags.flag_is_active(&request, &mut ctx, "staff-tools").await.unwrap());

    // Only the rollout decision becomes a cookie.
    let cookies = ctx.cookies(&flags.settings().snapshot());
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value, if search { "True" } else { "False" });
    assert!(cookies[0].to_header().contains("Max-Age=2592000"));

    // A later request replays the cookie and gets the same answer.
    let replay = RequestInfo::new().with_cookie_header(&format!(
        "{}={}",
        cookies[0].name, cookies[0].value
    ));
    let mut ctx = RequestFlagContext::new();
    assert_eq!(
        flags.flag_is_active(&replay, &mut ctx, "new-search").await.unwrap(),
        search
    );
}
