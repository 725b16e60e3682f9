// Shared, runtime-updatable settings handle

use crate::Settings;
use std::sync::{Arc, PoisonError, RwLock};

/// Resolves named options to their effective values.
///
/// Cloning is cheap and every clone observes the same values, so a value
/// changed through [`SettingsResolver::update`] is seen by the next read
/// everywhere. Readers never hold the lock across an await point.
#[derive(Debug, Clone, Default)]
pub struct SettingsResolver {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsResolver {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Run `f` against the current settings.
    pub fn read<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.read(Settings::clone)
    }

    /// Mutate the settings in place.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
        pennant_log::debug!("settings updated");
    }

    /// Replace all settings at once.
    pub fn replace(&self, settings: Settings) {
        self.update(|current| *current = settings);
    }

    pub fn flag_default(&self) -> bool {
        self.read(|s| s.flag_default)
    }

    pub fn switch_default(&self) -> bool {
        self.read(|s| s.switch_default)
    }

    pub fn sample_default(&self) -> bool {
        self.read(|s| s.sample_default)
    }

    pub fn override_enabled(&self) -> bool {
        self.read(|s| s.override_enabled)
    }
}

impl From<Settings> for SettingsResolver {
    fn from(settings: Settings) -> Self {
        Self::new(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_updates() {
        let resolver = SettingsResolver::default();
        let other = resolver.clone();

        assert!(!other.switch_default());
        resolver.update(|s| s.switch_default = true);
        assert!(other.switch_default());
    }

    #[test]
    fn test_replace() {
        let resolver = SettingsResolver::default();
        resolver.replace(Settings {
            flag_default: true,
            override_enabled: true,
            ..Settings::default()
        });

        assert!(resolver.flag_default());
        assert!(resolver.override_enabled());
        assert!(!resolver.sample_default());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let resolver = SettingsResolver::default();
        let snapshot = resolver.snapshot();
        resolver.update(|s| s.cache_prefix = "other:".to_string());
        assert_eq!(snapshot.cache_prefix, "pennant:");
        assert_eq!(resolver.read(|s| s.cache_prefix.clone()), "other:");
    }
}
