//! Typed ID definitions for all domain entities.
//!
//! This module defines type aliases for each domain entity, providing
//! compile-time type safety for ID usage throughout the application.
//!
//! # Example
//!
//! ```rust
//! use server_core::common::{AmbulanceId, UserId};
//!
//! // These are incompatible types - compiler prevents mixing them up
//! let user_id: UserId = UserId::new();
//! let ambulance_id: AmbulanceId = AmbulanceId::new();
//!
//! // This would be a compile error:
//! // let wrong: AmbulanceId = user_id;
//! ```

// Re-export the core Id type
pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (patients, operators, staff).
pub struct User;

/// Marker type for Ambulance entities (registered ambulance profiles).
pub struct Ambulance;

/// Marker type for DispatchRequest entities (patient dispatch requests).
pub struct DispatchRequest;

/// Marker type for Notification entities (in-app inbox entries).
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Ambulance entities.
pub type AmbulanceId = Id<Ambulance>;

/// Typed ID for DispatchRequest entities.
pub type DispatchRequestId = Id<DispatchRequest>;

/// Typed ID for Notification entities.
pub type NotificationId = Id<Notification>;
