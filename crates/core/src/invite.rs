//! Pending-invite acceptance outcomes.

use serde::Serialize;

use crate::roles::RoleSet;
use crate::types::StudioId;

/// Why an invite could not be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InviteRejection {
    /// The signed-in email differs from the invited email.
    #[serde(rename = "email_mismatch")]
    EmailMismatch,
    #[serde(rename = "invite_expired")]
    InviteExpired,
    /// The invite lacks a studio or role hint.
    #[serde(rename = "invite_incomplete")]
    InviteIncomplete,
    /// The acceptance call itself failed.
    #[serde(rename = "rpc-failed")]
    RpcFailed,
    /// The backend answered without confirming acceptance.
    #[serde(rename = "rpc-not-ok")]
    RpcNotOk,
    /// No invite token is stored.
    #[serde(rename = "no-token")]
    NoToken,
}

impl InviteRejection {
    /// Map a backend error code onto a rejection.
    pub fn from_backend(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "email_mismatch" => Self::EmailMismatch,
            "invite_expired" | "expired" => Self::InviteExpired,
            "invite_incomplete" => Self::InviteIncomplete,
            _ => Self::RpcNotOk,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailMismatch => "email_mismatch",
            Self::InviteExpired => "invite_expired",
            Self::InviteIncomplete => "invite_incomplete",
            Self::RpcFailed => "rpc-failed",
            Self::RpcNotOk => "rpc-not-ok",
            Self::NoToken => "no-token",
        }
    }

    /// Terminal rejections consume the stored token; transient ones keep it.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::EmailMismatch | Self::InviteExpired | Self::InviteIncomplete
        )
    }
}

/// Result of one invite acceptance attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InviteOutcome {
    Accepted {
        studio_id: Option<StudioId>,
        roles: RoleSet,
    },
    Rejected {
        reason: InviteRejection,
        message: Option<String>,
    },
}

impl InviteOutcome {
    pub fn rejected(reason: InviteRejection) -> Self {
        Self::Rejected {
            reason,
            message: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn rejection(&self) -> Option<InviteRejection> {
        match self {
            Self::Rejected { reason, .. } => Some(*reason),
            Self::Accepted { .. } => None,
        }
    }
}
