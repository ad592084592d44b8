//! Encore event bus and notification writer.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, shared by the session components.
//! - [`StudioEvent`]: the event envelope (level changes, context changes,
//!   accepted invites).
//! - [`NotificationWriter`]: background service that turns level-advanced
//!   events into `notifications` rows.

pub mod bus;
pub mod notifications;

pub use bus::{EventBus, StudioEvent};
pub use notifications::NotificationWriter;
