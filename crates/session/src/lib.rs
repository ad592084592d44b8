//! Session-side decision components for Encore.
//!
//! A page shell builds one [`StudioContextRouter`] and one
//! [`PointsRecalculator`] per session, wiring them to the collaborators in
//! this crate:
//!
//! - [`AuthProvider`] reports the signed-in user.
//! - [`ContextStore`] persists the active studio and pending invite.
//! - [`SessionFlags`] holds one-shot, session-scoped flags.
//! - [`Navigator`] moves the shell between pages.
//! - [`InviteAcceptor`] consumes a pending studio invite.

pub mod auth;
pub mod config;
pub mod context;
pub mod flags;
pub mod invite;
pub mod navigator;
pub mod points;
pub mod router;

pub use auth::{AuthProvider, SessionAuth};
pub use config::SessionConfig;
pub use context::{
    ActiveContext, ContextError, ContextStore, FileContextStore, MemoryContextStore, PendingInvite,
};
pub use flags::SessionFlags;
pub use invite::{InviteAcceptor, StoreInviteAcceptor};
pub use navigator::{Navigator, RecordingNavigator};
pub use points::{PointsRecalculator, PointsSummary, RecalcError};
pub use router::{ResolveOptions, RoleCheck, RouterError, StudioContextRouter, StudioRoles};
