//! The flag resolution chain.
//!
//! Each targeting rule is a [`Resolver`]. A [`Chain`] runs its resolvers in
//! order and stops at the first one that decides. The three standard chains
//! match the three evaluation entry points of
//! [`FlagService`](crate::FlagService):
//!
//! | chain | resolvers |
//! |---|---|
//! | [`Chain::user`] | everyone, staff, superuser, users, groups |
//! | [`Chain::request`] | override, everyone, testing, authenticated, languages, percent |
//! | [`Chain::combined`] | override, everyone, staff, superuser, users, groups, testing, authenticated, languages, percent |

use crate::context::{FlagRequest, FlagUser};
use crate::decisions::RequestFlagContext;
use crate::definition::FlagDefinition;
use crate::error::FlagResult;
use crate::percent::Percent;
use crate::service::FlagService;
use async_trait::async_trait;
use pennant_config::Settings;

/// Outcome of a single resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The rule does not apply; ask the next resolver
    Abstain,
    On,
    Off,
}

impl Resolution {
    /// Whether this outcome ends the chain.
    pub fn decided(self) -> bool {
        !matches!(self, Resolution::Abstain)
    }

    /// `On` for true, `Abstain` otherwise.
    pub fn on_if(condition: bool) -> Self {
        if condition { Resolution::On } else { Resolution::Abstain }
    }
}

impl From<bool> for Resolution {
    fn from(active: bool) -> Self {
        if active { Resolution::On } else { Resolution::Off }
    }
}

/// Everything a resolver may consult while evaluating one flag.
pub struct Scope<'a> {
    pub service: &'a FlagService,
    /// Settings snapshot taken at the start of the evaluation
    pub settings: &'a Settings,
    pub user: Option<&'a dyn FlagUser>,
    pub request: Option<&'a dyn FlagRequest>,
    pub flags: Option<&'a mut RequestFlagContext>,
}

/// One targeting rule.
#[async_trait]
pub trait Resolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution>;
}

/// `?<flag>=1` forces the flag on and any other value forces it off, when
/// `OVERRIDE` is enabled.
pub struct QueryOverride;

#[async_trait]
impl Resolver for QueryOverride {
    fn name(&self) -> &'static str {
        "override"
    }

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        if !scope.settings.override_enabled {
            return Ok(Resolution::Abstain);
        }
        Ok(match scope.request.and_then(|request| request.query(&flag.name)) {
            Some(value) => Resolution::from(value == "1"),
            None => Resolution::Abstain,
        })
    }
}

pub struct Everyone;

#[async_trait]
impl Resolver for Everyone {
    fn name(&self) -> &'static str {
        "everyone"
    }

    async fn resolve(&self, flag: &FlagDefinition, _scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        Ok(flag.everyone.map_or(Resolution::Abstain, Resolution::from))
    }
}

pub struct Staff;

#[async_trait]
impl Resolver for Staff {
    fn name(&self) -> &'static str {
        "staff"
    }

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        Ok(Resolution::on_if(
            flag.staff && scope.user.is_some_and(|user| user.is_staff()),
        ))
    }
}

pub struct Superuser;

#[async_trait]
impl Resolver for Superuser {
    fn name(&self) -> &'static str {
        "superuser"
    }

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        Ok(Resolution::on_if(
            flag.superusers && scope.user.is_some_and(|user| user.is_superuser()),
        ))
    }
}

/// On for users explicitly assigned to the flag.
pub struct UserMembership;

#[async_trait]
impl Resolver for UserMembership {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        let Some(id) = scope.user.and_then(|user| user.id()) else {
            return Ok(Resolution::Abstain);
        };
        let users = scope.service.cached_flag_users(scope.settings, &flag.name).await?;
        Ok(Resolution::on_if(users.contains(&id)))
    }
}

/// On for members of a group explicitly assigned to the flag.
pub struct GroupMembership;

#[async_trait]
impl Resolver for GroupMembership {
    fn name(&self) -> &'static str {
        "groups"
    }

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        let member_of = match scope.user {
            Some(user) => user.groups(),
            None => return Ok(Resolution::Abstain),
        };
        if member_of.is_empty() {
            return Ok(Resolution::Abstain);
        }
        let groups = scope.service.cached_flag_groups(scope.settings, &flag.name).await?;
        Ok(Resolution::on_if(
            member_of.iter().any(|group| groups.contains(group)),
        ))
    }
}

/// The testing query parameter, then the testing cookie, decide the flag.
///
/// Only applies to flags with `testing` set. A query decision is recorded so
/// the response can set the testing cookie.
pub struct Testing;

#[async_trait]
impl Resolver for Testing {
    fn name(&self) -> &'static str {
        "testing"
    }

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        let Some(request) = scope.request else {
            return Ok(Resolution::Abstain);
        };
        if !flag.testing {
            return Ok(Resolution::Abstain);
        }

        let name = scope.settings.test_cookie_name(&flag.name);
        if let Some(value) = request.query(&name) {
            let active = value == "1";
            if let Some(flags) = scope.flags.as_deref_mut() {
                flags.set_test(flag.name.clone(), active);
            }
            return Ok(Resolution::from(active));
        }
        Ok(match request.cookie(&name) {
            Some(value) => Resolution::from(value == "True"),
            None => Resolution::Abstain,
        })
    }
}

/// On for any authenticated user when the flag targets them.
pub struct Authenticated;

#[async_trait]
impl Resolver for Authenticated {
    fn name(&self) -> &'static str {
        "authenticated"
    }

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        Ok(Resolution::on_if(
            flag.authenticated && scope.user.is_some_and(|user| user.is_authenticated()),
        ))
    }
}

pub struct Language;

#[async_trait]
impl Resolver for Language {
    fn name(&self) -> &'static str {
        "languages"
    }

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        if flag.languages.is_empty() {
            return Ok(Resolution::Abstain);
        }
        let language = scope.request.and_then(|request| request.language());
        Ok(Resolution::on_if(
            language.is_some_and(|code| flag.languages.iter().any(|listed| listed == code)),
        ))
    }
}

/// Sticky random rollout.
///
/// A decision already recorded for this request wins, then the rollout
/// cookie from an earlier response, then a fresh draw. Every decision taken
/// here is recorded, so it stays stable for the rest of the request and ends
/// up in a cookie.
pub struct PercentRollout;

#[async_trait]
impl Resolver for PercentRollout {
    fn name(&self) -> &'static str {
        "percent"
    }

    async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        let Some(percent) = flag.percent.filter(Percent::is_positive) else {
            return Ok(Resolution::Abstain);
        };

        if let Some(decision) = scope.flags.as_deref().and_then(|flags| flags.get(&flag.name)) {
            return Ok(Resolution::from(decision.active));
        }

        let cookie = scope
            .request
            .and_then(|request| request.cookie(&scope.settings.cookie_name(&flag.name)));
        let active = match cookie {
            Some(value) => value == "True",
            None => {
                let draw = Percent::random();
                pennant_log::trace!("flag {} drew {} against {}", flag.name, draw, percent);
                percent.admits(draw)
            }
        };

        if let Some(flags) = scope.flags.as_deref_mut() {
            flags.set(flag.name.clone(), active, !flag.rollout);
        }
        Ok(Resolution::from(active))
    }
}

/// An ordered list of resolvers.
pub struct Chain {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl Chain {
    pub fn new(resolvers: Vec<Box<dyn Resolver>>) -> Self {
        Self { resolvers }
    }

    /// Rules that need only a user.
    pub fn user() -> Self {
        Self::new(vec![
            Box::new(Everyone),
            Box::new(Staff),
            Box::new(Superuser),
            Box::new(UserMembership),
            Box::new(GroupMembership),
        ])
    }

    /// Rules that need only the request.
    pub fn request() -> Self {
        Self::new(vec![
            Box::new(QueryOverride),
            Box::new(Everyone),
            Box::new(Testing),
            Box::new(Authenticated),
            Box::new(Language),
            Box::new(PercentRollout),
        ])
    }

    /// Every rule, with the user taken from the request.
    pub fn combined() -> Self {
        Self::new(vec![
            Box::new(QueryOverride),
            Box::new(Everyone),
            Box::new(Staff),
            Box::new(Superuser),
            Box::new(UserMembership),
            Box::new(GroupMembership),
            Box::new(Testing),
            Box::new(Authenticated),
            Box::new(Language),
            Box::new(PercentRollout),
        ])
    }

    /// Append a resolver after the existing ones.
    pub fn with(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|resolver| resolver.name()).collect()
    }

    /// Run the resolvers in order. `Abstain` means none of them decided.
    pub async fn resolve(&self, flag: &FlagDefinition, scope: &mut Scope<'_>) -> FlagResult<Resolution> {
        for resolver in &self.resolvers {
            let resolution = resolver.resolve(flag, scope).await?;
            if resolution.decided() {
                pennant_log::trace!(
                    "flag {} resolved {:?} by {}",
                    flag.name,
                    resolution,
                    resolver.name()
                );
                return Ok(resolution);
            }
        }
        Ok(Resolution::Abstain)
    }
}
