//! Studio context resolution and routing.
//!
//! On every page load the shell asks [`StudioContextRouter::resolve`] which
//! studio the signed-in user is working in and whether it should move to
//! another page:
//!
//! | Memberships | Outcome |
//! |-------------|---------|
//! | none        | try the pending invite once per session, then onboarding |
//! | one         | adopt that studio, home (only if `redirect_home`) |
//! | many        | keep a valid stored studio, otherwise the studio picker |
//!
//! A navigation is only issued when the shell is not already on the target
//! page, so resolving again after landing is a no-op.

use std::sync::Arc;

use encore_core::invite::InviteOutcome;
use encore_core::roles::RoleSet;
use encore_core::routing::{
    active_studio_is_valid, is_current_page, MembershipCount, RouteDecision, RouteReason,
    RouteTarget, RouteTargets,
};
use encore_core::types::{StudioId, UserId};
use encore_db::models::studio_member::StudioMembership;
use encore_db::repositories::StudioMemberRepo;
use encore_db::{DataStore, StoreError};
use encore_events::bus::{EVENT_CONTEXT_CHANGED, EVENT_INVITE_ACCEPTED};
use encore_events::{EventBus, StudioEvent};
use serde::Serialize;
use serde_json::json;

use crate::auth::AuthProvider;
use crate::context::{ActiveContext, ContextError, ContextStore, PendingInvite};
use crate::flags::{SessionFlags, INVITE_ACCEPT_ATTEMPTED};
use crate::invite::InviteAcceptor;
use crate::navigator::Navigator;

/// Options for [`StudioContextRouter::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Send single-studio users to the home page.
    pub redirect_home: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            redirect_home: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Membership lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Roles the user holds in the active studio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudioRoles {
    pub studio_id: Option<StudioId>,
    pub roles: RoleSet,
}

/// Result of [`StudioContextRouter::require_any_role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleCheck {
    pub ok: bool,
    pub roles: RoleSet,
    pub studio_id: Option<StudioId>,
}

/// Decides the studio context and landing page for the signed-in user.
pub struct StudioContextRouter {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DataStore>,
    context: Arc<dyn ContextStore>,
    invites: Arc<dyn InviteAcceptor>,
    navigator: Arc<dyn Navigator>,
    flags: Arc<SessionFlags>,
    targets: RouteTargets,
    events: Option<Arc<EventBus>>,
}

impl StudioContextRouter {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DataStore>,
        context: Arc<dyn ContextStore>,
        invites: Arc<dyn InviteAcceptor>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth,
            store,
            context,
            invites,
            navigator,
            flags: Arc::new(SessionFlags::new()),
            targets: RouteTargets::default(),
            events: None,
        }
    }

    /// Share session flags with other routers in the same session.
    pub fn with_flags(mut self, flags: Arc<SessionFlags>) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_targets(mut self, targets: RouteTargets) -> Self {
        self.targets = targets;
        self
    }

    /// Publish context-change and invite events on `bus`.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Resolve the user's studio context and navigate if needed.
    ///
    /// Never fails: a missing session or a failed membership query is
    /// reported through [`RouteDecision::reason`].
    pub async fn resolve(&self, options: ResolveOptions) -> RouteDecision {
        let Some(user_id) = self.auth.current_user_id().await else {
            tracing::debug!("No signed-in user, skipping studio routing");
            return RouteDecision::halted(RouteReason::NoAuth);
        };

        let Ok(mut memberships) = self.memberships(&user_id).await else {
            return RouteDecision::halted(RouteReason::QueryError);
        };
        tracing::debug!(user_id, count = memberships.len(), "Loaded studio memberships");

        let mut invite = None;
        if memberships.is_empty() && self.flags.try_claim(INVITE_ACCEPT_ATTEMPTED) {
            let outcome = self.invites.accept_pending_if_any().await;
            if let InviteOutcome::Accepted { studio_id, .. } = &outcome {
                self.publish(
                    StudioEvent::new(EVENT_INVITE_ACCEPTED)
                        .for_user(user_id.clone())
                        .with_payload(json!({ "studio_id": studio_id })),
                );
                match self.memberships(&user_id).await {
                    Ok(refreshed) => memberships = refreshed,
                    Err(_) => {
                        return RouteDecision::halted(RouteReason::QueryError)
                            .with_invite(Some(outcome));
                    }
                }
            }
            invite = Some(outcome);
        }

        let decision = match MembershipCount::of(memberships.len()) {
            MembershipCount::None => {
                tracing::info!(user_id, "User has no studio memberships");
                self.go(RouteTarget::Onboarding, true)
            }
            MembershipCount::One => {
                self.adopt(&user_id, &memberships[0]);
                self.go(RouteTarget::Home, options.redirect_home)
            }
            MembershipCount::Many => self.resolve_many(&user_id, &memberships),
        };
        decision.with_invite(invite)
    }

    fn resolve_many(&self, user_id: &str, memberships: &[StudioMembership]) -> RouteDecision {
        let active = ActiveContext::studio_id(self.context.as_ref());
        let ids = memberships.iter().map(|m| m.studio_id.as_str());
        if !active_studio_is_valid(active.as_deref(), ids) {
            tracing::info!(user_id, stored = ?active, "Active studio missing or stale");
            return self.go(RouteTarget::StudioPicker, true);
        }

        if let Some(membership) = memberships
            .iter()
            .find(|m| Some(m.studio_id.as_str()) == active.as_deref())
        {
            self.adopt(user_id, membership);
        }
        RouteDecision::stay()
    }

    /// Make `studio_id` the active studio (studio picker choice) and go home.
    pub async fn select_studio(&self, studio_id: &str) -> RouteDecision {
        let Some(user_id) = self.auth.current_user_id().await else {
            return RouteDecision::halted(RouteReason::NoAuth);
        };
        let Ok(memberships) = self.memberships(&user_id).await else {
            return RouteDecision::halted(RouteReason::QueryError);
        };

        let studio_id = studio_id.trim();
        match memberships.iter().find(|m| m.studio_id == studio_id) {
            Some(membership) => {
                self.adopt(&user_id, membership);
                self.go(RouteTarget::Home, true)
            }
            None => {
                tracing::warn!(user_id, studio_id, "Studio selection is not a membership");
                RouteDecision::halted(RouteReason::NotAMember)
            }
        }
    }

    /// Roles the user holds in the active studio.
    ///
    /// With no active studio stored, a single-studio user's studio is
    /// adopted. The stored roles are refreshed from the membership row.
    pub async fn active_studio_roles(&self) -> Result<StudioRoles, RouterError> {
        let user_id = self
            .auth
            .current_user_id()
            .await
            .ok_or(RouterError::NotSignedIn)?;

        let studio_id = match ActiveContext::studio_id(self.context.as_ref()) {
            Some(studio_id) => studio_id,
            None => {
                let memberships = StudioMemberRepo::list_for_user(self.store.as_ref(), &user_id).await?;
                match memberships.as_slice() {
                    [only] => {
                        self.adopt(&user_id, only);
                        return Ok(StudioRoles {
                            studio_id: Some(only.studio_id.clone()),
                            roles: only.roles.clone(),
                        });
                    }
                    _ => return Ok(StudioRoles::default()),
                }
            }
        };

        let membership =
            StudioMemberRepo::find(self.store.as_ref(), &user_id, &studio_id).await?;
        let roles = match membership {
            Some(membership) => {
                self.store_context(|ctx| ActiveContext::save_roles(ctx, &membership.roles));
                membership.roles
            }
            None => {
                tracing::warn!(user_id, studio_id, "Active studio has no membership row");
                RoleSet::default()
            }
        };
        Ok(StudioRoles {
            studio_id: Some(studio_id),
            roles,
        })
    }

    /// Gate a staff page: does the user hold any of `required` in the
    /// active studio? When not, and `redirect` is set, go home.
    pub async fn require_any_role(&self, required: &[&str], redirect: bool) -> RoleCheck {
        let studio_roles = match self.active_studio_roles().await {
            Ok(studio_roles) => studio_roles,
            Err(e) => {
                tracing::warn!(error = %e, "Role lookup failed, denying access");
                StudioRoles::default()
            }
        };
        let ok = studio_roles.roles.contains_any(required);
        if !ok {
            tracing::info!(?required, held = %studio_roles.roles, "Access denied");
            if redirect {
                self.go(RouteTarget::Home, true);
            }
        }
        RoleCheck {
            ok,
            roles: studio_roles.roles,
            studio_id: studio_roles.studio_id,
        }
    }

    /// Forget the active context and pending invite, and re-arm session
    /// flags.
    pub fn logout(&self) -> Result<(), ContextError> {
        ActiveContext::clear(self.context.as_ref())?;
        PendingInvite::clear(self.context.as_ref())?;
        self.flags.reset();
        tracing::info!("Session context cleared");
        Ok(())
    }

    async fn memberships(&self, user_id: &UserId) -> Result<Vec<StudioMembership>, StoreError> {
        StudioMemberRepo::list_for_user(self.store.as_ref(), user_id)
            .await
            .inspect_err(|e| {
                tracing::error!(user_id, error = %e, "Studio membership query failed");
            })
    }

    /// Persist `membership` as the active context, publishing a change event
    /// when the studio or roles differ from what was stored.
    fn adopt(&self, user_id: &str, membership: &StudioMembership) {
        let next = ActiveContext {
            studio_id: membership.studio_id.clone(),
            roles: membership.roles.clone(),
        };
        let previous = ActiveContext::load(self.context.as_ref());
        self.store_context(|ctx| next.save(ctx));

        if previous.as_ref() != Some(&next) {
            tracing::info!(user_id, studio_id = %next.studio_id, roles = %next.roles, "Active studio set");
            self.publish(
                StudioEvent::new(EVENT_CONTEXT_CHANGED)
                    .for_user(user_id)
                    .in_studio(next.studio_id.clone())
                    .with_payload(json!({ "roles": next.roles })),
            );
        }
    }

    /// Context writes are advisory; a failure is logged and routing goes on.
    fn store_context<F>(&self, write: F)
    where
        F: FnOnce(&dyn ContextStore) -> Result<(), ContextError>,
    {
        if let Err(e) = write(self.context.as_ref()) {
            tracing::warn!(error = %e, "Failed to persist studio context");
        }
    }

    fn go(&self, target: RouteTarget, allowed: bool) -> RouteDecision {
        let page = self.targets.page(target);
        let navigate = allowed && !is_current_page(&self.navigator.current_page(), page);
        if navigate {
            tracing::info!(?target, page, "Redirecting");
            self.navigator.navigate(page);
        }
        RouteDecision::to(target, navigate)
    }

    fn publish(&self, event: StudioEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}
