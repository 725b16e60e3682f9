//! Evaluation entry points.

use crate::context::{FlagRequest, FlagUser};
use crate::decisions::RequestFlagContext;
use crate::definition::{FlagDefinition, SampleDefinition, SwitchDefinition};
use crate::error::{FlagError, FlagResult};
use crate::percent::Percent;
use crate::resolver::{Chain, Resolution, Scope};
use crate::store::DefinitionStore;
use pennant_cache::{CacheStore, read_through};
use pennant_config::{Settings, SettingsResolver};
use std::sync::Arc;

/// Flag, switch and sample evaluation over a cache and a definition store.
///
/// Build one per application and share it behind an `Arc`.
///
/// ```
/// use pennant_cache::InMemoryCache;
/// use pennant_config::SettingsResolver;
/// use pennant_flags::{FlagDefinition, FlagService, MemoryStore, UserInfo};
/// use std::sync::Arc;
///
/// # async fn example() -> pennant_flags::FlagResult<()> {
/// let store = MemoryStore::new();
/// store.upsert_flag(FlagDefinition::new("beta").with_staff(true)).await;
///
/// let flags = FlagService::new(
///     SettingsResolver::default(),
///     Arc::new(InMemoryCache::new()),
///     Arc::new(store),
/// );
///
/// let admin = UserInfo::new("1").with_staff(true);
/// assert!(flags.flag_is_active_for_user(&admin, "beta").await?);
/// # Ok(())
/// # }
/// ```
pub struct FlagService {
    settings: SettingsResolver,
    cache: Arc<dyn CacheStore>,
    store: Arc<dyn DefinitionStore>,
    user_chain: Chain,
    request_chain: Chain,
    combined_chain: Chain,
}

impl FlagService {
    pub fn new(
        settings: SettingsResolver,
        cache: Arc<dyn CacheStore>,
        store: Arc<dyn DefinitionStore>,
    ) -> Self {
        Self {
            settings,
            cache,
            store,
            user_chain: Chain::user(),
            request_chain: Chain::request(),
            combined_chain: Chain::combined(),
        }
    }

    pub fn settings(&self) -> &SettingsResolver {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn DefinitionStore> {
        &self.store
    }

    /// Look up a flag definition, cache first.
    ///
    /// `None` means the flag is not defined. No default is applied here.
    pub async fn get_flag(&self, name: &str) -> FlagResult<Option<FlagDefinition>> {
        self.lookup_flag(&self.settings.snapshot(), name).await
    }

    /// Ids of the users explicitly assigned to a flag.
    pub async fn flag_users(&self, name: &str) -> FlagResult<Vec<String>> {
        self.cached_flag_users(&self.settings.snapshot(), name).await
    }

    /// Ids of the groups explicitly assigned to a flag.
    pub async fn flag_groups(&self, name: &str) -> FlagResult<Vec<String>> {
        self.cached_flag_groups(&self.settings.snapshot(), name).await
    }

    async fn lookup_flag(&self, settings: &Settings, name: &str) -> FlagResult<Option<FlagDefinition>> {
        if name.is_empty() {
            return Ok(None);
        }
        let key = settings.flag_key(name);
        read_through(self.cache.as_ref(), &key, settings.cache_ttl(), move || async move {
            pennant_log::debug!("loading flag {} from store", name);
            Ok::<_, FlagError>(self.store.get_flag(name).await?)
        })
        .await
    }

    pub(crate) async fn cached_flag_users(&self, settings: &Settings, name: &str) -> FlagResult<Vec<String>> {
        let key = settings.flag_users_key(name);
        let users = read_through(self.cache.as_ref(), &key, settings.cache_ttl(), move || async move {
            pennant_log::debug!("loading users of flag {} from store", name);
            Ok::<_, FlagError>(Some(self.store.flag_users(name).await?))
        })
        .await?;
        Ok(users.unwrap_or_default())
    }

    pub(crate) async fn cached_flag_groups(&self, settings: &Settings, name: &str) -> FlagResult<Vec<String>> {
        let key = settings.flag_groups_key(name);
        let groups = read_through(self.cache.as_ref(), &key, settings.cache_ttl(), move || async move {
            pennant_log::debug!("loading groups of flag {} from store", name);
            Ok::<_, FlagError>(Some(self.store.flag_groups(name).await?))
        })
        .await?;
        Ok(groups.unwrap_or_default())
    }

    /// Evaluate a flag for a user, outside of any request.
    pub async fn flag_is_active_for_user(&self, user: &dyn FlagUser, name: &str) -> FlagResult<bool> {
        self.evaluate(&self.user_chain, name, Some(user), None, None)
            .await
    }

    /// Evaluate a flag with the request-only rules.
    pub async fn flag_is_active_for_request(
        &self,
        request: &dyn FlagRequest,
        ctx: &mut RequestFlagContext,
        name: &str,
    ) -> FlagResult<bool> {
        self.evaluate(&self.request_chain, name, request.user(), Some(request), Some(ctx))
            .await
    }

    /// Evaluate a flag with every rule, taking the user from the request.
    pub async fn flag_is_active(
        &self,
        request: &dyn FlagRequest,
        ctx: &mut RequestFlagContext,
        name: &str,
    ) -> FlagResult<bool> {
        self.evaluate(&self.combined_chain, name, request.user(), Some(request), Some(ctx))
            .await
    }

    /// Evaluate a flag through any chain.
    ///
    /// An undefined flag yields `FLAG_DEFAULT`. A defined flag that no
    /// resolver decides is off.
    pub async fn evaluate(
        &self,
        chain: &Chain,
        name: &str,
        user: Option<&dyn FlagUser>,
        request: Option<&dyn FlagRequest>,
        flags: Option<&mut RequestFlagContext>,
    ) -> FlagResult<bool> {
        let settings = self.settings.snapshot();
        let Some(flag) = self.lookup_flag(&settings, name).await? else {
            pennant_log::debug!("flag {:?} is not defined, using FLAG_DEFAULT", name);
            return Ok(settings.flag_default);
        };

        let mut scope = Scope {
            service: self,
            settings: &settings,
            user,
            request,
            flags,
        };
        let resolution = chain.resolve(&flag, &mut scope).await?;
        Ok(resolution == Resolution::On)
    }

    /// Look up a switch, cache first.
    pub async fn get_switch(&self, name: &str) -> FlagResult<Switch> {
        let settings = self.settings.snapshot();
        let key = settings.switch_key(name);
        let switch = read_through(self.cache.as_ref(), &key, settings.cache_ttl(), move || async move {
            pennant_log::debug!("loading switch {} from store", name);
            Ok::<_, FlagError>(self.store.get_switch(name).await?)
        })
        .await?;

        Ok(match switch {
            Some(switch) => Switch::Defined(switch),
            None => Switch::Missing(DoesNotExist {
                name: name.to_string(),
                settings: self.settings.clone(),
            }),
        })
    }

    pub async fn switch_is_active(&self, name: &str) -> FlagResult<bool> {
        Ok(self.get_switch(name).await?.active())
    }

    /// Look up a sample, cache first.
    pub async fn get_sample(&self, name: &str) -> FlagResult<Option<SampleDefinition>> {
        let settings = self.settings.snapshot();
        let key = settings.sample_key(name);
        read_through(self.cache.as_ref(), &key, settings.cache_ttl(), move || async move {
            pennant_log::debug!("loading sample {} from store", name);
            Ok::<_, FlagError>(self.store.get_sample(name).await?)
        })
        .await
    }

    /// A fresh draw against the sample's percentage on every call.
    pub async fn sample_is_active(&self, name: &str) -> FlagResult<bool> {
        match self.get_sample(name).await? {
            Some(sample) => Ok(sample.percent.admits(Percent::random())),
            None => Ok(self.settings.sample_default()),
        }
    }

    /// Drop the cached definition and membership lists of a flag.
    pub async fn uncache_flag(&self, name: &str) -> FlagResult<()> {
        let keys = self.settings.read(|settings| {
            [
                settings.flag_key(name),
                settings.flag_users_key(name),
                settings.flag_groups_key(name),
            ]
        });
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.cache.delete_many(&keys).await?;
        Ok(())
    }

    pub async fn uncache_switch(&self, name: &str) -> FlagResult<()> {
        let key = self.settings.read(|settings| settings.switch_key(name));
        self.cache.delete(&key).await?;
        Ok(())
    }

    pub async fn uncache_sample(&self, name: &str) -> FlagResult<()> {
        let key = self.settings.read(|settings| settings.sample_key(name));
        self.cache.delete(&key).await?;
        Ok(())
    }
}

/// Result of a switch lookup.
#[derive(Debug, Clone)]
pub enum Switch {
    Defined(SwitchDefinition),
    Missing(DoesNotExist),
}

impl Switch {
    pub fn name(&self) -> &str {
        match self {
            Switch::Defined(switch) => &switch.name,
            Switch::Missing(missing) => missing.name(),
        }
    }

    pub fn active(&self) -> bool {
        match self {
            Switch::Defined(switch) => switch.active,
            Switch::Missing(missing) => missing.active(),
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Switch::Defined(_))
    }
}

/// Stand-in for a switch missing from the store.
///
/// Its state follows `SWITCH_DEFAULT` as currently configured, including
/// changes made after the lookup.
#[derive(Debug, Clone)]
pub struct DoesNotExist {
    name: String,
    settings: SettingsResolver,
}

impl DoesNotExist {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active(&self) -> bool {
        self.settings.switch_default()
    }
}
