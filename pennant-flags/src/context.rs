//! What the engine needs to know about the caller.
//!
//! The web framework owns the real request and user objects. It exposes them
//! to the engine through [`FlagRequest`] and [`FlagUser`]; [`RequestInfo`] and
//! [`UserInfo`] are plain implementations for adapters and tests.

use std::collections::HashMap;

/// The user a flag is evaluated for.
pub trait FlagUser: Send + Sync {
    /// Stable identifier, `None` for anonymous users.
    fn id(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.id().is_some()
    }

    fn is_staff(&self) -> bool {
        false
    }

    fn is_superuser(&self) -> bool {
        false
    }

    /// Identifiers of the groups the user belongs to.
    fn groups(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Read-only view of an inbound request.
pub trait FlagRequest: Send + Sync {
    /// Query string parameter
    fn query(&self, name: &str) -> Option<&str>;

    /// Request cookie
    fn cookie(&self, name: &str) -> Option<&str>;

    /// The user attached to the request, if any
    fn user(&self) -> Option<&dyn FlagUser>;

    /// Resolved locale code of the request
    fn language(&self) -> Option<&str> {
        None
    }
}

/// User attributes as plain data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub id: Option<String>,
    pub authenticated: bool,
    pub staff: bool,
    pub superuser: bool,
    pub groups: Vec<String>,
}

impl UserInfo {
    /// An authenticated user.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            authenticated: true,
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_staff(mut self, staff: bool) -> Self {
        self.staff = staff;
        self
    }

    pub fn with_superuser(mut self, superuser: bool) -> Self {
        self.superuser = superuser;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

impl FlagUser for UserInfo {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn is_staff(&self) -> bool {
        self.staff
    }

    fn is_superuser(&self) -> bool {
        self.superuser
    }

    fn groups(&self) -> Vec<String> {
        self.groups.clone()
    }
}

/// Request attributes as plain data.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub query: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub user: Option<UserInfo>,
    pub language: Option<String>,
}

impl RequestInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Add every cookie from a `Cookie` header value such as `"a=1; b=2"`.
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        let pairs = header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim(), value.trim().trim_matches('"')))
            .filter(|(name, _)| !name.is_empty());
        for (name, value) in pairs {
            self.cookies.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl FlagRequest for RequestInfo {
    fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn user(&self) -> Option<&dyn FlagUser> {
        self.user.as_ref().map(|user| user as &dyn FlagUser)
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}
