//! Ambulances domain - fleet profiles and operator access
//!
//! Responsibilities:
//! - Registration (one ambulance per operator account)
//! - Ownership checks for crew operations
//! - Profile and position storage models

pub mod access;
pub mod actions;
pub mod models;

pub use access::{authorize_operator, OperatorAccess};
pub use models::Ambulance;
