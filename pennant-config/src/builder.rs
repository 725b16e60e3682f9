// SettingsBuilder - layered settings resolution

use crate::env::DEFAULT_PREFIX;
use crate::{ConfigError, ConfigLoader, EnvLoader, FileFormat, Result, Settings, SettingsResolver, Validate};
use std::collections::HashMap;

/// Builds a [`SettingsResolver`] from layered sources.
///
/// Later layers win: defaults, then files in the order added, then the
/// `.env` file, then process environment variables, then explicit values.
pub struct SettingsBuilder {
    base: Settings,
    prefix: String,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<String>,
    files: Vec<(String, FileFormat)>,
    overrides: Vec<(String, String)>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            base: Settings::default(),
            prefix: DEFAULT_PREFIX.to_string(),
            load_env: false,
            load_dotenv: false,
            dotenv_path: None,
            files: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Start from these settings instead of the defaults
    pub fn with_base(mut self, settings: Settings) -> Self {
        self.base = settings;
        self
    }

    /// Set environment variable prefix (default `PENNANT`)
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Enable loading from environment variables
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Enable loading from a .env file, before environment variables are read
    pub fn load_dotenv(mut self, path: Option<String>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = path;
        self
    }

    /// Add a settings file to load
    pub fn add_file(mut self, path: impl Into<String>, format: FileFormat) -> Self {
        self.files.push((path.into(), format));
        self
    }

    /// Set one option explicitly
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<SettingsResolver> {
        let mut settings = self.base;

        for (path, format) in &self.files {
            let values = ConfigLoader::new(*format).load_file(path)?;
            apply_known(&mut settings, values, path)?;
        }

        if self.load_dotenv {
            let loaded = match self.dotenv_path.as_deref() {
                Some(path) => dotenvy::from_path(path).map(|_| ()),
                None => dotenvy::dotenv().map(|_| ()),
            };
            if let Err(e) = loaded {
                // A missing .env file is not an error; a named one is.
                if self.dotenv_path.is_some() {
                    return Err(ConfigError::LoadError(e.to_string()));
                }
                pennant_log::debug!("no .env file loaded: {}", e);
            }
        }

        if self.load_env {
            let values = EnvLoader::new(self.prefix.clone()).load()?;
            apply_known(&mut settings, values, "environment")?;
        }

        for (key, value) in &self.overrides {
            settings.apply(key, value)?;
        }

        settings.validate()?;
        Ok(SettingsResolver::new(settings))
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_known(settings: &mut Settings, values: HashMap<String, String>, source: &str) -> Result<()> {
    for (key, value) in values {
        match settings.apply(&key, &value) {
            Ok(()) => {}
            Err(ConfigError::UnknownSetting(name)) => {
                pennant_log::warn!("ignoring unknown setting {} from {}", name, source);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
