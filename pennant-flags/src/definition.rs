//! Flag, switch and sample definitions.
//!
//! Definitions are owned by the definition store. The engine only holds
//! transient copies, either fresh from the store or from the cache.

use crate::percent::Percent;
use serde::{Deserialize, Serialize};

/// A feature flag with independent targeting rules.
///
/// The rules are not evaluated in field order; precedence is fixed by the
/// resolver chains in [`crate::resolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDefinition {
    /// Unique flag name
    pub name: String,

    /// Force the flag on (`Some(true)`) or off (`Some(false)`) for everybody
    #[serde(default)]
    pub everyone: Option<bool>,

    /// Share of requests that get the flag through random rollout
    #[serde(default)]
    pub percent: Option<Percent>,

    /// Allow the testing query parameter and cookie to decide the flag
    #[serde(default)]
    pub testing: bool,

    #[serde(default)]
    pub superusers: bool,

    #[serde(default)]
    pub staff: bool,

    /// On for every authenticated user
    #[serde(default)]
    pub authenticated: bool,

    /// Locale codes the flag is on for
    #[serde(default)]
    pub languages: Vec<String>,

    /// Whether a rollout decision persists beyond the session
    #[serde(default)]
    pub rollout: bool,

    #[serde(default)]
    pub note: Option<String>,
}

impl FlagDefinition {
    /// A flag with every rule unset.
    ///
    /// ```
    /// use pennant_flags::{FlagDefinition, Percent};
    ///
    /// let flag = FlagDefinition::new("new-checkout")
    ///     .with_staff(true)
    ///     .with_percent(Percent::whole(10).unwrap())
    ///     .with_rollout(true);
    /// assert_eq!(flag.name, "new-checkout");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            everyone: None,
            percent: None,
            testing: false,
            superusers: false,
            staff: false,
            authenticated: false,
            languages: Vec::new(),
            rollout: false,
            note: None,
        }
    }

    pub fn with_everyone(mut self, everyone: Option<bool>) -> Self {
        self.everyone = everyone;
        self
    }

    pub fn with_percent(mut self, percent: Percent) -> Self {
        self.percent = Some(percent);
        self
    }

    pub fn with_testing(mut self, testing: bool) -> Self {
        self.testing = testing;
        self
    }

    pub fn with_superusers(mut self, superusers: bool) -> Self {
        self.superusers = superusers;
        self
    }

    pub fn with_staff(mut self, staff: bool) -> Self {
        self.staff = staff;
        self
    }

    pub fn with_authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    /// Set the locales from a comma-separated list such as `"en,de, fr"`.
    pub fn with_languages(mut self, languages: &str) -> Self {
        self.languages = languages
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn with_rollout(mut self, rollout: bool) -> Self {
        self.rollout = rollout;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A global on/off toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchDefinition {
    pub name: String,
    pub active: bool,
    #[serde(default)]
    pub note: Option<String>,
}

impl SwitchDefinition {
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        Self {
            name: name.into(),
            active,
            note: None,
        }
    }
}

/// A probability gate, redrawn on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDefinition {
    pub name: String,
    pub percent: Percent,
    #[serde(default)]
    pub note: Option<String>,
}

impl SampleDefinition {
    pub fn new(name: impl Into<String>, percent: Percent) -> Self {
        Self {
            name: name.into(),
            percent,
            note: None,
        }
    }
}
