//! Who is signed in.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use encore_core::types::UserId;

/// Source of the authenticated user id.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user's id, or `None` when nobody is signed in.
    async fn current_user_id(&self) -> Option<UserId>;
}

/// Auth state held in memory for the lifetime of a session.
#[derive(Debug, Default)]
pub struct SessionAuth {
    user_id: RwLock<Option<UserId>>,
}

impl SessionAuth {
    pub fn new(user_id: Option<UserId>) -> Self {
        Self {
            user_id: RwLock::new(user_id),
        }
    }

    pub fn signed_in(user_id: impl Into<UserId>) -> Self {
        Self::new(Some(user_id.into()))
    }

    pub fn sign_in(&self, user_id: impl Into<UserId>) {
        *self.user_id.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id.into());
    }

    pub fn sign_out(&self) {
        *self.user_id.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[async_trait]
impl AuthProvider for SessionAuth {
    async fn current_user_id(&self) -> Option<UserId> {
        self.user_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|id| !id.trim().is_empty())
    }
}
