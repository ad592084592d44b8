//! Pure domain logic for the Encore achievement tracker.
//!
//! Nothing in this crate performs I/O. The `encore-db` and `encore-session`
//! crates feed it rows fetched from the backend and act on its decisions.

pub mod activity;
pub mod error;
pub mod invite;
pub mod levels;
pub mod roles;
pub mod routing;
pub mod types;
