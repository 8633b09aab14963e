//! Dispatch domain - proximity matching and the request lifecycle
//!
//! The patient side (`dispatcher`) finds nearby ambulances and creates
//! requests; the crew side (`lifecycle`) resolves them and manages
//! availability. All state lives behind the directory trait; everything in
//! `geo` is pure.

pub mod dispatcher;
pub mod error;
pub mod geo;
pub mod lifecycle;
pub mod models;

pub use error::DispatchError;
pub use models::{DispatchRequest, RequestStatus};
