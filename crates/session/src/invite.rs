//! Pending-invite acceptance.

use std::sync::Arc;

use async_trait::async_trait;
use encore_core::invite::{InviteOutcome, InviteRejection};
use encore_core::roles::RoleSet;
use encore_core::types::id_from_value;
use encore_db::repositories::InviteRepo;
use encore_db::DataStore;
use serde_json::Value;

use crate::context::{ContextStore, PendingInvite};

/// Consumes the pending invite, if one is stored.
///
/// Never fails: every problem is reported as an
/// [`InviteOutcome::Rejected`] reason.
#[async_trait]
pub trait InviteAcceptor: Send + Sync {
    async fn accept_pending_if_any(&self) -> InviteOutcome;
}

/// Accepts invites through the backend's invite functions, keeping the
/// token in a [`ContextStore`].
pub struct StoreInviteAcceptor {
    store: Arc<dyn DataStore>,
    context: Arc<dyn ContextStore>,
}

impl StoreInviteAcceptor {
    pub fn new(store: Arc<dyn DataStore>, context: Arc<dyn ContextStore>) -> Self {
        Self { store, context }
    }

    /// Validate an invite token from an invite link and stash it for
    /// acceptance after sign-in.
    ///
    /// Unknown, expired or incomplete invites clear whatever was pending.
    pub async fn validate_and_stash(&self, token: &str) -> Result<PendingInvite, InviteRejection> {
        let token = token.trim();
        if token.is_empty() {
            return Err(InviteRejection::NoToken);
        }

        let invite = match InviteRepo::validate(self.store.as_ref(), token).await {
            Ok(Some(invite)) => invite,
            Ok(None) => {
                tracing::info!("Invite token not found, expired, or already used");
                self.clear_pending();
                return Err(InviteRejection::InviteExpired);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Invite validation failed");
                self.clear_pending();
                return Err(InviteRejection::RpcFailed);
            }
        };

        let studio_id = id_from_value(&invite["studio_id"]);
        let role_hint = non_blank(&invite["role_hint"]);
        let (Some(studio_id), Some(role_hint)) = (studio_id, role_hint) else {
            tracing::info!("Invite is missing studio or role details");
            self.clear_pending();
            return Err(InviteRejection::InviteIncomplete);
        };

        let pending = PendingInvite {
            token: token.to_string(),
            studio_id: Some(studio_id),
            email: non_blank(&invite["invited_email"]),
            role_hint: Some(role_hint),
        };
        if let Err(e) = pending.save(self.context.as_ref()) {
            tracing::error!(error = %e, "Failed to store pending invite");
            return Err(InviteRejection::RpcFailed);
        }
        tracing::info!(studio_id = ?pending.studio_id, "Invite validated and stored");
        Ok(pending)
    }

    fn clear_pending(&self) {
        if let Err(e) = PendingInvite::clear(self.context.as_ref()) {
            tracing::warn!(error = %e, "Failed to clear pending invite");
        }
    }

    fn accepted(&self, invite: &PendingInvite, response: &Value) -> InviteOutcome {
        let mut roles = RoleSet::from_value(&response["roles"]);
        if roles.is_empty() {
            roles = invite
                .role_hint
                .as_deref()
                .map(RoleSet::from_csv)
                .unwrap_or_default();
        }
        InviteOutcome::Accepted {
            studio_id: id_from_value(&response["studio_id"]).or_else(|| invite.studio_id.clone()),
            roles,
        }
    }
}

#[async_trait]
impl InviteAcceptor for StoreInviteAcceptor {
    async fn accept_pending_if_any(&self) -> InviteOutcome {
        let Some(invite) = PendingInvite::load(self.context.as_ref()) else {
            tracing::debug!("No pending invite to accept");
            return InviteOutcome::rejected(InviteRejection::NoToken);
        };

        let response = match InviteRepo::accept(self.store.as_ref(), &invite.token).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Invite acceptance call failed");
                return InviteOutcome::Rejected {
                    reason: InviteRejection::RpcFailed,
                    message: Some(e.to_string()),
                };
            }
        };

        if response["ok"].as_bool() == Some(true) {
            let outcome = self.accepted(&invite, &response);
            self.clear_pending();
            tracing::info!(studio_id = ?invite.studio_id, "Invite accepted");
            return outcome;
        }

        let reason = response["error"]
            .as_str()
            .or_else(|| response["reason"].as_str())
            .map_or(InviteRejection::RpcNotOk, InviteRejection::from_backend);
        if reason.is_terminal() {
            self.clear_pending();
        }
        tracing::info!(reason = reason.as_str(), "Invite not accepted");
        InviteOutcome::Rejected {
            reason,
            message: non_blank(&response["message"]),
        }
    }
}

fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
