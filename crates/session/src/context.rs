//! Client-persisted session context.
//!
//! The page shell keeps a handful of string keys in durable local storage:
//! the active studio with its roles, and the pending invite captured from
//! an invite link. [`ContextStore`] abstracts that storage; [`ActiveContext`]
//! and [`PendingInvite`] are the only code that touches the raw keys.
//!
//! Stored values are advisory. The router re-validates them against fresh
//! membership rows on every resolution.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use encore_core::roles::RoleSet;
use encore_core::types::StudioId;
use serde_json::Value;

/// Persisted key names.
pub mod keys {
    pub const ACTIVE_STUDIO_ID: &str = "activeStudioId";
    pub const ACTIVE_STUDIO_ROLES: &str = "activeStudioRoles";
    pub const PENDING_INVITE_TOKEN: &str = "pendingInviteToken";
    pub const PENDING_INVITE_STUDIO_ID: &str = "pendingInviteStudioId";
    pub const PENDING_INVITE_EMAIL: &str = "pendingInviteEmail";
    pub const PENDING_INVITE_ROLE_HINT: &str = "pendingInviteRoleHint";
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Context storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Context storage is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable key/value storage for session context.
pub trait ContextStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), ContextError>;

    fn remove(&self, key: &str) -> Result<(), ContextError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), ContextError>;
}

fn lock(map: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MemoryContextStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryContextStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContextStore for MemoryContextStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ContextError> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ContextError> {
        lock(&self.values).remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), ContextError> {
        lock(&self.values).clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileContextStore
// ---------------------------------------------------------------------------

/// Context kept in a JSON object on disk, written through on every change.
#[derive(Debug)]
pub struct FileContextStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileContextStore {
    /// Open the store at `path`, loading existing values. A missing file is
    /// an empty store; it is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ContextError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), ContextError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ContextStore for FileContextStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ContextError> {
        let mut values = lock(&self.values);
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), ContextError> {
        let mut values = lock(&self.values);
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), ContextError> {
        let mut values = lock(&self.values);
        values.clear();
        self.flush(&values)
    }
}

// ---------------------------------------------------------------------------
// ActiveContext
// ---------------------------------------------------------------------------

/// The studio a multi-studio user is working in, with their roles there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveContext {
    pub studio_id: StudioId,
    pub roles: RoleSet,
}

impl ActiveContext {
    /// The stored context, if a studio id is stored.
    pub fn load(store: &dyn ContextStore) -> Option<Self> {
        let studio_id = Self::studio_id(store)?;
        Some(Self {
            studio_id,
            roles: Self::roles(store),
        })
    }

    /// The stored active studio id, trimmed; blank counts as unset.
    pub fn studio_id(store: &dyn ContextStore) -> Option<StudioId> {
        store
            .get(keys::ACTIVE_STUDIO_ID)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    /// Stored roles. Written as a JSON array; older values may be CSV.
    pub fn roles(store: &dyn ContextStore) -> RoleSet {
        match store.get(keys::ACTIVE_STUDIO_ROLES) {
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => RoleSet::from_value(&value),
                Err(_) => RoleSet::from_csv(&raw),
            },
            None => RoleSet::default(),
        }
    }

    pub fn save(&self, store: &dyn ContextStore) -> Result<(), ContextError> {
        store.set(keys::ACTIVE_STUDIO_ID, &self.studio_id)?;
        Self::save_roles(store, &self.roles)
    }

    pub fn save_roles(store: &dyn ContextStore, roles: &RoleSet) -> Result<(), ContextError> {
        store.set(keys::ACTIVE_STUDIO_ROLES, &roles.to_value().to_string())
    }

    pub fn clear(store: &dyn ContextStore) -> Result<(), ContextError> {
        store.remove(keys::ACTIVE_STUDIO_ID)?;
        store.remove(keys::ACTIVE_STUDIO_ROLES)
    }
}

// ---------------------------------------------------------------------------
// PendingInvite
// ---------------------------------------------------------------------------

/// An invite captured from an invite link, awaiting acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInvite {
    pub token: String,
    pub studio_id: Option<StudioId>,
    pub email: Option<String>,
    pub role_hint: Option<String>,
}

impl PendingInvite {
    /// The stored invite, if a non-blank token is stored.
    pub fn load(store: &dyn ContextStore) -> Option<Self> {
        let non_blank = |key: &str| {
            store
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Some(Self {
            token: non_blank(keys::PENDING_INVITE_TOKEN)?,
            studio_id: non_blank(keys::PENDING_INVITE_STUDIO_ID),
            email: non_blank(keys::PENDING_INVITE_EMAIL),
            role_hint: non_blank(keys::PENDING_INVITE_ROLE_HINT),
        })
    }

    pub fn save(&self, store: &dyn ContextStore) -> Result<(), ContextError> {
        Self::clear(store)?;
        store.set(keys::PENDING_INVITE_TOKEN, &self.token)?;
        let optional = [
            (keys::PENDING_INVITE_STUDIO_ID, &self.studio_id),
            (keys::PENDING_INVITE_EMAIL, &self.email),
            (keys::PENDING_INVITE_ROLE_HINT, &self.role_hint),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                store.set(key, value)?;
            }
        }
        Ok(())
    }

    pub fn clear(store: &dyn ContextStore) -> Result<(), ContextError> {
        for key in [
            keys::PENDING_INVITE_TOKEN,
            keys::PENDING_INVITE_STUDIO_ID,
            keys::PENDING_INVITE_EMAIL,
            keys::PENDING_INVITE_ROLE_HINT,
        ] {
            store.remove(key)?;
        }
        Ok(())
    }
}
