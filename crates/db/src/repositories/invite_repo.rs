//! Backend functions behind studio invites.

use serde_json::{json, Value};

use crate::error::StoreError;
use crate::store::DataStore;

/// Accepts the invite for the signed-in user. Returns
/// `{ ok, studio_id, roles, error }`.
pub const ACCEPT_INVITE_FN: &str = "accept_studio_invite";

/// Looks up an invite by token. Returns the invite row (or a one-element
/// array of it) with `studio_id`, `role_hint`, `invited_email`.
pub const VALIDATE_INVITE_FN: &str = "validate_invite_token";

pub struct InviteRepo;

impl InviteRepo {
    pub async fn accept(store: &dyn DataStore, token: &str) -> Result<Value, StoreError> {
        store
            .rpc(ACCEPT_INVITE_FN, json!({ "p_token": token }))
            .await
    }

    /// The invite row for `token`, or `None` when the backend has none.
    pub async fn validate(store: &dyn DataStore, token: &str) -> Result<Option<Value>, StoreError> {
        let result = store
            .rpc(VALIDATE_INVITE_FN, json!({ "p_token": token }))
            .await?;
        Ok(match result {
            Value::Array(mut rows) if !rows.is_empty() => Some(rows.remove(0)),
            Value::Object(_) => Some(result),
            _ => None,
        })
    }
}
