//! Settings resolution for the Pennant flag engine.
//!
//! Every option has a built-in default (see [`Settings::default`]) which a
//! deployment can override from settings files, a `.env` file, or
//! `PENNANT_*` environment variables.
//!
//! ```
//! use pennant_config::SettingsBuilder;
//!
//! let settings = SettingsBuilder::new()
//!     .set("OVERRIDE", "true")
//!     .build()
//!     .unwrap();
//!
//! assert!(settings.override_enabled());
//! assert_eq!(settings.read(|s| s.flag_key("beta")), "pennant:flag:beta");
//! ```

pub mod builder;
pub mod env;
pub mod error;
pub mod loader;
pub mod resolver;
pub mod settings;
pub mod validation;

pub use builder::SettingsBuilder;
pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use resolver::SettingsResolver;
pub use settings::{format_template, Settings, SETTING_NAMES};
pub use validation::{ConfigValidator, Validate};
