//! Feature flags for Pennant
//!
//! Decides whether a named feature is on for a user or a request, with
//! definitions read through a cache in front of a definition store.
//!
//! # Features
//!
//! - **Flags** - Targeting by user, group, staff, superuser, authentication and locale
//! - **Gradual Rollout** - Percentage rollout kept sticky with cookies
//! - **Testing** - Query parameter and cookie driven decisions for QA
//! - **Switches** - Global on/off toggles
//! - **Samples** - Random percentage gates, redrawn on every call
//!
//! # Quick Start
//!
//! ```
//! use pennant_cache::InMemoryCache;
//! use pennant_config::SettingsResolver;
//! use pennant_flags::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> FlagResult<()> {
//! let store = MemoryStore::new();
//! store
//!     .upsert_flag(
//!         FlagDefinition::new("new-checkout")
//!             .with_percent(Percent::whole(25)?)
//!             .with_rollout(true),
//!     )
//!     .await;
//!
//! let flags = FlagService::new(
//!     SettingsResolver::default(),
//!     Arc::new(InMemoryCache::new()),
//!     Arc::new(store),
//! );
//!
//! let request = RequestInfo::new().with_cookie_header("pnf_new-checkout=True");
//! let mut ctx = RequestFlagContext::new();
//! assert!(flags.flag_is_active(&request, &mut ctx, "new-checkout").await?);
//!
//! // Cookies for the response keep the decision sticky.
//! let cookies = ctx.cookies(&flags.settings().snapshot());
//! assert_eq!(cookies[0].name, "pnf_new-checkout");
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod decisions;
pub mod definition;
pub mod error;
pub mod percent;
pub mod resolver;
pub mod service;
pub mod store;

pub use context::{FlagRequest, FlagUser, RequestInfo, UserInfo};
pub use decisions::{
    FlagCookie, FlagDecision, RequestFlagContext, cookie_value, is_cookie_safe, set_flag,
};
pub use definition::{FlagDefinition, SampleDefinition, SwitchDefinition};
pub use error::{FlagError, FlagResult, StoreError, StoreResult};
pub use percent::Percent;
pub use resolver::{Chain, Resolution, Resolver, Scope};
pub use service::{DoesNotExist, FlagService, Switch};
pub use store::{DefinitionStore, MemoryStore};
