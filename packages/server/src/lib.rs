// Lifeline Hospital Operations - API Core
//
// This crate provides the backend API for the ambulance dispatch core:
// proximity matching between patients and available ambulances, and the
// request accept/decline lifecycle that flips ambulance availability
// exactly once per mission.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
