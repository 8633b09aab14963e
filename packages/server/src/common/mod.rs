// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod id;

pub use auth::AuthError;
pub use entity_ids::{AmbulanceId, DispatchRequestId, NotificationId, UserId};
pub use id::Id;
