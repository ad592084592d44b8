//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&dyn DataStore` as the first argument and return typed models.

pub mod activity_log_repo;
pub mod invite_repo;
pub mod level_repo;
pub mod notification_repo;
pub mod studio_member_repo;
pub mod user_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use invite_repo::InviteRepo;
pub use level_repo::LevelRepo;
pub use notification_repo::NotificationRepo;
pub use studio_member_repo::StudioMemberRepo;
pub use user_repo::UserRepo;
