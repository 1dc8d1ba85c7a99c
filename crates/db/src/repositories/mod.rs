//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod scheduled_notification_repo;

pub use scheduled_notification_repo::ScheduledNotificationRepo;
