//! Route targets and the pure parts of studio-context routing.
//!
//! The async orchestration lives in `encore-session`; this module holds the
//! decision vocabulary and the branching rules that need no I/O.

use serde::Serialize;

use crate::invite::InviteOutcome;

/// Surfaces a resolution can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
    Home,
    /// The "no studio yet" surface.
    Onboarding,
    StudioPicker,
}

/// Page names for each [`RouteTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTargets {
    pub home: String,
    pub onboarding: String,
    pub studio_picker: String,
}

impl RouteTargets {
    pub fn page(&self, target: RouteTarget) -> &str {
        match target {
            RouteTarget::Home => &self.home,
            RouteTarget::Onboarding => &self.onboarding,
            RouteTarget::StudioPicker => &self.studio_picker,
        }
    }
}

impl Default for RouteTargets {
    fn default() -> Self {
        Self {
            home: "index.html".to_string(),
            onboarding: "settings.html".to_string(),
            studio_picker: "select-studio.html".to_string(),
        }
    }
}

/// Why resolution stopped without a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteReason {
    #[serde(rename = "no-auth")]
    NoAuth,
    #[serde(rename = "query-error")]
    QueryError,
    #[serde(rename = "not-a-member")]
    NotAMember,
}

impl RouteReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAuth => "no-auth",
            Self::QueryError => "query-error",
            Self::NotAMember => "not-a-member",
        }
    }
}

/// What the page shell should do after a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    /// Whether a navigation was issued.
    pub redirected: bool,
    pub target: Option<RouteTarget>,
    pub reason: Option<RouteReason>,
    /// Set when an invite acceptance was attempted during this resolution.
    pub invite: Option<InviteOutcome>,
}

impl RouteDecision {
    /// Resolution stopped early; nothing was navigated.
    pub fn halted(reason: RouteReason) -> Self {
        Self {
            redirected: false,
            target: None,
            reason: Some(reason),
            invite: None,
        }
    }

    /// The current context is valid; stay on the page.
    pub fn stay() -> Self {
        Self {
            redirected: false,
            target: None,
            reason: None,
            invite: None,
        }
    }

    pub fn to(target: RouteTarget, redirected: bool) -> Self {
        Self {
            redirected,
            target: Some(target),
            reason: None,
            invite: None,
        }
    }

    pub fn with_invite(mut self, invite: Option<InviteOutcome>) -> Self {
        self.invite = invite;
        self
    }
}

/// How many studios a user belongs to, as far as routing cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipCount {
    None,
    One,
    Many,
}

impl MembershipCount {
    pub fn of(len: usize) -> Self {
        match len {
            0 => Self::None,
            1 => Self::One,
            _ => Self::Many,
        }
    }
}

/// A stored active studio is valid only if it is one of the current
/// membership ids.
pub fn active_studio_is_valid<'a, I>(active: Option<&str>, membership_ids: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    match active.map(str::trim) {
        Some(active) if !active.is_empty() => membership_ids.into_iter().any(|id| id == active),
        _ => false,
    }
}

/// Whether `current` (a path, possibly with query or fragment) already
/// points at `page`.
pub fn is_current_page(current: &str, page: &str) -> bool {
    let path = current.split(['?', '#']).next().unwrap_or_default();
    if page.is_empty() {
        return false;
    }
    match path.strip_suffix(page) {
        Some(prefix) => prefix.is_empty() || prefix.ends_with('/') || prefix.ends_with('\\'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_count_branches() {
        assert_eq!(MembershipCount::of(0), MembershipCount::None);
        assert_eq!(MembershipCount::of(1), MembershipCount::One);
        assert_eq!(MembershipCount::of(2), MembershipCount::Many);
        assert_eq!(MembershipCount::of(17), MembershipCount::Many);
    }

    #[test]
    fn active_studio_must_be_a_membership() {
        let ids = ["s1", "s2"];
        assert!(active_studio_is_valid(Some("s2"), ids));
        assert!(!active_studio_is_valid(Some("s3"), ids));
        assert!(!active_studio_is_valid(None, ids));
        assert!(!active_studio_is_valid(Some("  "), ids));
    }

    #[test]
    fn current_page_matches_path_suffix() {
        assert!(is_current_page("/app/index.html", "index.html"));
        assert!(is_current_page("index.html", "index.html"));
        assert!(is_current_page("C:\\site\\index.html", "index.html"));
        assert!(is_current_page("/select-studio.html?from=login#top", "select-studio.html"));
        assert!(!is_current_page("/app/my-index.html", "index.html"));
        assert!(!is_current_page("/app/settings.html", "index.html"));
        assert!(!is_current_page("/app/index.html", ""));
    }

    #[test]
    fn default_targets_name_pages() {
        let targets = RouteTargets::default();
        assert_eq!(targets.page(RouteTarget::Home), "index.html");
        assert_eq!(targets.page(RouteTarget::Onboarding), "settings.html");
        assert_eq!(targets.page(RouteTarget::StudioPicker), "select-studio.html");
    }

    #[test]
    fn halted_decision_serializes_reason() {
        let json = serde_json::to_value(RouteDecision::halted(RouteReason::NoAuth)).unwrap();
        assert_eq!(json["redirected"], false);
        assert_eq!(json["reason"], "no-auth");
        assert!(json["target"].is_null());
    }
}
