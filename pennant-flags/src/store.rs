//! Definition store contract and an in-memory implementation.

use crate::definition::{FlagDefinition, SampleDefinition, SwitchDefinition};
use crate::error::StoreResult;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persistent source of flag, switch and sample definitions.
///
/// Lookups are by exact name. A missing definition is `Ok(None)`, never an
/// error.
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    async fn get_flag(&self, name: &str) -> StoreResult<Option<FlagDefinition>>;

    async fn get_switch(&self, name: &str) -> StoreResult<Option<SwitchDefinition>>;

    async fn get_sample(&self, name: &str) -> StoreResult<Option<SampleDefinition>>;

    /// Ids of the users explicitly assigned to a flag.
    async fn flag_users(&self, name: &str) -> StoreResult<Vec<String>>;

    /// Ids of the groups explicitly assigned to a flag.
    async fn flag_groups(&self, name: &str) -> StoreResult<Vec<String>>;
}

#[derive(Debug, Default)]
struct Tables {
    flags: HashMap<String, FlagDefinition>,
    switches: HashMap<String, SwitchDefinition>,
    samples: HashMap<String, SampleDefinition>,
    users: HashMap<String, BTreeSet<String>>,
    groups: HashMap<String, BTreeSet<String>>,
}

/// In-memory definition store.
///
/// Clones share the same tables, so a test can keep a handle and edit
/// definitions while a [`FlagService`](crate::FlagService) reads them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a flag.
    pub async fn upsert_flag(&self, flag: FlagDefinition) {
        let mut tables = self.tables.write().await;
        tables.flags.insert(flag.name.clone(), flag);
    }

    pub async fn upsert_switch(&self, switch: SwitchDefinition) {
        let mut tables = self.tables.write().await;
        tables.switches.insert(switch.name.clone(), switch);
    }

    pub async fn upsert_sample(&self, sample: SampleDefinition) {
        let mut tables = self.tables.write().await;
        tables.samples.insert(sample.name.clone(), sample);
    }

    /// Remove a flag together with its user and group assignments.
    pub async fn remove_flag(&self, name: &str) -> Option<FlagDefinition> {
        let mut tables = self.tables.write().await;
        tables.users.remove(name);
        tables.groups.remove(name);
        tables.flags.remove(name)
    }

    pub async fn remove_switch(&self, name: &str) -> Option<SwitchDefinition> {
        self.tables.write().await.switches.remove(name)
    }

    pub async fn remove_sample(&self, name: &str) -> Option<SampleDefinition> {
        self.tables.write().await.samples.remove(name)
    }

    pub async fn add_flag_user(&self, flag: &str, user_id: impl Into<String>) {
        let mut tables = self.tables.write().await;
        tables
            .users
            .entry(flag.to_string())
            .or_default()
            .insert(user_id.into());
    }

    pub async fn remove_flag_user(&self, flag: &str, user_id: &str) -> bool {
        let mut tables = self.tables.write().await;
        tables
            .users
            .get_mut(flag)
            .is_some_and(|users| users.remove(user_id))
    }

    pub async fn add_flag_group(&self, flag: &str, group_id: impl Into<String>) {
        let mut tables = self.tables.write().await;
        tables
            .groups
            .entry(flag.to_string())
            .or_default()
            .insert(group_id.into());
    }

    pub async fn remove_flag_group(&self, flag: &str, group_id: &str) -> bool {
        let mut tables = self.tables.write().await;
        tables
            .groups
            .get_mut(flag)
            .is_some_and(|groups| groups.remove(group_id))
    }
}

#[async_trait]
impl DefinitionStore for MemoryStore {
    async fn get_flag(&self, name: &str) -> StoreResult<Option<FlagDefinition>> {
        Ok(self.tables.read().await.flags.get(name).cloned())
    }

    async fn get_switch(&self, name: &str) -> StoreResult<Option<SwitchDefinition>> {
        Ok(self.tables.read().await.switches.get(name).cloned())
    }

    async fn get_sample(&self, name: &str) -> StoreResult<Option<SampleDefinition>> {
        Ok(self.tables.read().await.samples.get(name).cloned())
    }

    async fn flag_users(&self, name: &str) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .get(name)
            .map(|users| users.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn flag_groups(&self, name: &str) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .get(name)
            .map(|groups| groups.iter().cloned().collect())
            .unwrap_or_default())
    }
}
