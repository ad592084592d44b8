//! Studio membership rows.

use encore_core::roles::RoleSet;
use encore_core::types::{StudioId, UserId};
use serde::Deserialize;

use super::de;

/// A row from the `studio_members` table.
///
/// `roles` are scoped to the studio and independent of `users.roles`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudioMembership {
    #[serde(default, deserialize_with = "de::opt_id")]
    pub user_id: Option<UserId>,
    #[serde(deserialize_with = "de::id")]
    pub studio_id: StudioId,
    #[serde(default)]
    pub roles: RoleSet,
}
