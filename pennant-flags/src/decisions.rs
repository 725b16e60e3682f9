//! Per-request record of flag decisions.

use pennant_config::Settings;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// A flag decision made during one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagDecision {
    pub active: bool,
    /// Keep the decision for the browser session only
    pub session_only: bool,
}

/// Decisions made while handling one request.
///
/// Create one per request and pass it by `&mut` to every request-scoped
/// evaluation. Percentage decisions recorded here are reused for the rest
/// of the request, and the transport layer turns them into cookies with
/// [`RequestFlagContext::cookies`] so that later requests stay sticky.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFlagContext {
    decisions: HashMap<String, FlagDecision>,
    tests: HashMap<String, bool>,
}

impl RequestFlagContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, flag: &str) -> Option<FlagDecision> {
        self.decisions.get(flag).copied()
    }

    /// Record a decision, replacing any earlier one for the same flag.
    pub fn set(&mut self, flag: impl Into<String>, active: bool, session_only: bool) {
        self.decisions.insert(
            flag.into(),
            FlagDecision {
                active,
                session_only,
            },
        );
    }

    /// Decision taken from the testing query parameter.
    pub fn test(&self, flag: &str) -> Option<bool> {
        self.tests.get(flag).copied()
    }

    pub fn set_test(&mut self, flag: impl Into<String>, active: bool) {
        self.tests.insert(flag.into(), active);
    }

    pub fn decisions(&self) -> impl Iterator<Item = (&str, FlagDecision)> {
        self.decisions.iter().map(|(name, decision)| (name.as_str(), *decision))
    }

    pub fn tests(&self) -> impl Iterator<Item = (&str, bool)> {
        self.tests.iter().map(|(name, active)| (name.as_str(), *active))
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty() && self.tests.is_empty()
    }

    /// Cookies the response should set, ordered by cookie name.
    ///
    /// Each decision becomes a rollout cookie that lives for `MAX_AGE`, or for
    /// the session when the decision is session-only. Each testing decision
    /// becomes a session cookie. Flags whose cookie name would not be a valid
    /// cookie token are skipped.
    pub fn cookies(&self, settings: &Settings) -> Vec<FlagCookie> {
        let mut cookies = BTreeMap::new();

        for (flag, decision) in &self.decisions {
            if !is_cookie_safe(flag) {
                pennant_log::warn!("not setting a cookie for flag {:?}: unsafe name", flag);
                continue;
            }
            let cookie = FlagCookie {
                name: settings.cookie_name(flag),
                value: cookie_value(decision.active).to_string(),
                max_age: (!decision.session_only).then(|| settings.max_age()),
                secure: settings.secure,
            };
            cookies.insert(cookie.name.clone(), cookie);
        }

        for (flag, active) in &self.tests {
            if !is_cookie_safe(flag) {
                pennant_log::warn!("not setting a test cookie for flag {:?}: unsafe name", flag);
                continue;
            }
            let cookie = FlagCookie {
                name: settings.test_cookie_name(flag),
                value: cookie_value(*active).to_string(),
                max_age: None,
                secure: settings.secure,
            };
            cookies.insert(cookie.name.clone(), cookie);
        }

        cookies.into_values().collect()
    }
}

/// Record a decision for `flag` on the request.
///
/// Percentage rollout reuses the decision for the rest of the request instead
/// of drawing, and [`RequestFlagContext::cookies`] turns it into a cookie.
pub fn set_flag(ctx: &mut RequestFlagContext, flag: &str, active: bool, session_only: bool) {
    ctx.set(flag, active, session_only);
}

/// Whether `name` can be embedded in a cookie name: non-empty, visible
/// ASCII, and free of the separators `Set-Cookie` reserves.
pub fn is_cookie_safe(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
}

/// Literal cookie value for a decision.
pub fn cookie_value(active: bool) -> &'static str {
    if active { "True" } else { "False" }
}

/// A cookie for the transport layer to set on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagCookie {
    pub name: String,
    pub value: String,
    /// `None` for a session cookie
    pub max_age: Option<Duration>,
    pub secure: bool,
}

impl FlagCookie {
    /// Render as a `Set-Cookie` header value.
    pub fn to_header(&self) -> String {
        let mut header = format!("{}={}; Path=/", self.name, self.value);
        if let Some(max_age) = self.max_age {
            header.push_str(&format!("; Max-Age={}", max_age.as_secs()));
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}
