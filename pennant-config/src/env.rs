// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Prefix used when none is given explicitly.
pub const DEFAULT_PREFIX: &str = "PENNANT";

/// Reads `<PREFIX>_<SETTING>` environment variables.
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key.to_uppercase())
    }

    /// Collect every prefixed variable, keyed by the setting name without prefix.
    pub fn load(&self) -> Result<HashMap<String, String>> {
        let marker = format!("{}_", self.prefix);
        let vars = env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix(&marker)
                    .map(|name| (name.to_uppercase(), value))
            })
            .collect();
        Ok(vars)
    }

    /// Load a specific setting
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
