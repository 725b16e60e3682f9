// Pennant - feature flags, switches and samples
//
// This library decides whether a named feature is on for a user or a request,
// with definitions read through a cache in front of a definition store.

// Re-export the evaluation engine
pub use pennant_flags::*;

// Re-export supporting crates
pub use pennant_cache;
pub use pennant_config;
pub use pennant_flags;
pub use pennant_log;

pub use pennant_cache::{CacheStore, InMemoryCache};
pub use pennant_config::{Settings, SettingsBuilder, SettingsResolver};

#[cfg(feature = "redis")]
pub use pennant_cache::RedisCache;

/// Prelude for common imports.
///
/// ```
/// use pennant::prelude::*;
///
/// let flag = FlagDefinition::new("new-checkout").with_staff(true);
/// assert!(flag.staff);
/// ```
pub mod prelude {
    pub use pennant_cache::{CacheStore, InMemoryCache};
    pub use pennant_config::{Settings, SettingsBuilder, SettingsResolver};
    pub use pennant_flags::{
        DefinitionStore, FlagDefinition, FlagError, FlagRequest, FlagResult, FlagService,
        FlagUser, MemoryStore, Percent, RequestFlagContext, RequestInfo, SampleDefinition,
        SwitchDefinition, UserInfo, set_flag,
    };
}
