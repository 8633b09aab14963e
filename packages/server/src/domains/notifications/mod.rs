//! Notifications domain - the durable in-app inbox
//!
//! Rows are written by the notifier when dispatch events happen; users read
//! and acknowledge them through the notifications routes.

pub mod actions;
pub mod models;

pub use actions::{list_notifications, mark_notification_read};
pub use models::Notification;
