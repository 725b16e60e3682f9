// Named settings and their defaults

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder replaced by the entity name in key and cookie templates.
pub const PLACEHOLDER: &str = "%s";

/// Every option the flag engine recognizes, with its effective value.
///
/// Field names serialize as the upper-case option names (`FLAG_DEFAULT`,
/// `COOKIE`, ...), which is also how they are addressed from environment
/// variables and settings files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    /// Result for a flag that is not defined in the store
    pub flag_default: bool,
    /// Result for a switch that is not defined in the store
    pub switch_default: bool,
    /// Result for a sample that is not defined in the store
    pub sample_default: bool,
    /// Allow `?<flag>=1` / `?<flag>=0` to force a flag from the query string
    #[serde(rename = "OVERRIDE")]
    pub override_enabled: bool,
    /// Rollout cookie name template
    pub cookie: String,
    /// Testing cookie and query parameter name template
    pub test_cookie: String,
    /// Lifetime of persistent rollout cookies, in seconds
    pub max_age: u64,
    /// Mark rollout cookies as secure
    pub secure: bool,
    /// Prepended to every cache key
    pub cache_prefix: String,
    /// Lifetime of cached definitions in seconds, 0 keeps them until invalidated
    pub cache_ttl: u64,
    pub flag_cache_key: String,
    pub flag_users_cache_key: String,
    pub flag_groups_cache_key: String,
    pub switch_cache_key: String,
    pub sample_cache_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            flag_default: false,
            switch_default: false,
            sample_default: false,
            override_enabled: false,
            cookie: "pnf_%s".to_string(),
            test_cookie: "pnft_%s".to_string(),
            max_age: 60 * 60 * 24 * 30,
            secure: false,
            cache_prefix: "pennant:".to_string(),
            cache_ttl: 0,
            flag_cache_key: "flag:%s".to_string(),
            flag_users_cache_key: "flag:%s:users".to_string(),
            flag_groups_cache_key: "flag:%s:groups".to_string(),
            switch_cache_key: "switch:%s".to_string(),
            sample_cache_key: "sample:%s".to_string(),
        }
    }
}

/// Option names, as accepted by [`Settings::apply`].
pub const SETTING_NAMES: &[&str] = &[
    "FLAG_DEFAULT",
    "SWITCH_DEFAULT",
    "SAMPLE_DEFAULT",
    "OVERRIDE",
    "COOKIE",
    "TEST_COOKIE",
    "MAX_AGE",
    "SECURE",
    "CACHE_PREFIX",
    "CACHE_TTL",
    "FLAG_CACHE_KEY",
    "FLAG_USERS_CACHE_KEY",
    "FLAG_GROUPS_CACHE_KEY",
    "SWITCH_CACHE_KEY",
    "SAMPLE_CACHE_KEY",
];

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::parse(key, format!("expected a boolean, got {:?}", other))),
    }
}

fn parse_seconds(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::parse(key, format!("expected seconds: {}", e)))
}

/// Substitute `name` into a `%s` template.
pub fn format_template(template: &str, name: &str) -> String {
    template.replacen(PLACEHOLDER, name, 1)
}

impl Settings {
    /// Assign a single option from its textual value.
    ///
    /// `key` is matched case-insensitively against [`SETTING_NAMES`].
    pub fn apply(&mut self, key: &str, raw: &str) -> Result<()> {
        let name = key.trim().to_ascii_uppercase();
        match name.as_str() {
            "FLAG_DEFAULT" => self.flag_default = parse_bool(&name, raw)?,
            "SWITCH_DEFAULT" => self.switch_default = parse_bool(&name, raw)?,
            "SAMPLE_DEFAULT" => self.sample_default = parse_bool(&name, raw)?,
            "OVERRIDE" => self.override_enabled = parse_bool(&name, raw)?,
            "SECURE" => self.secure = parse_bool(&name, raw)?,
            "MAX_AGE" => self.max_age = parse_seconds(&name, raw)?,
            "CACHE_TTL" => self.cache_ttl = parse_seconds(&name, raw)?,
            "COOKIE" => self.cookie = raw.to_string(),
            "TEST_COOKIE" => self.test_cookie = raw.to_string(),
            "CACHE_PREFIX" => self.cache_prefix = raw.to_string(),
            "FLAG_CACHE_KEY" => self.flag_cache_key = raw.to_string(),
            "FLAG_USERS_CACHE_KEY" => self.flag_users_cache_key = raw.to_string(),
            "FLAG_GROUPS_CACHE_KEY" => self.flag_groups_cache_key = raw.to_string(),
            "SWITCH_CACHE_KEY" => self.switch_cache_key = raw.to_string(),
            "SAMPLE_CACHE_KEY" => self.sample_cache_key = raw.to_string(),
            _ => return Err(ConfigError::UnknownSetting(name)),
        }
        Ok(())
    }

    /// Build a cache key: `CACHE_PREFIX` followed by the formatted template.
    ///
    /// ```
    /// use pennant_config::Settings;
    ///
    /// let settings = Settings::default();
    /// assert_eq!(settings.keyfmt(&settings.flag_cache_key, "beta"), "pennant:flag:beta");
    /// ```
    pub fn keyfmt(&self, template: &str, name: &str) -> String {
        format!("{}{}", self.cache_prefix, format_template(template, name))
    }

    pub fn flag_key(&self, name: &str) -> String {
        self.keyfmt(&self.flag_cache_key, name)
    }

    pub fn flag_users_key(&self, name: &str) -> String {
        self.keyfmt(&self.flag_users_cache_key, name)
    }

    pub fn flag_groups_key(&self, name: &str) -> String {
        self.keyfmt(&self.flag_groups_cache_key, name)
    }

    pub fn switch_key(&self, name: &str) -> String {
        self.keyfmt(&self.switch_cache_key, name)
    }

    pub fn sample_key(&self, name: &str) -> String {
        self.keyfmt(&self.sample_cache_key, name)
    }

    /// Name of the rollout cookie carrying a flag's sticky decision.
    pub fn cookie_name(&self, flag: &str) -> String {
        format_template(&self.cookie, flag)
    }

    /// Name of the testing cookie, also used as the testing query parameter.
    pub fn test_cookie_name(&self, flag: &str) -> String {
        format_template(&self.test_cookie, flag)
    }

    /// TTL for cached definitions, `None` when they never expire.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl > 0).then(|| Duration::from_secs(self.cache_ttl))
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age)
    }
}
