// HTTP routes
pub mod ambulances;
pub mod dispatch;
pub mod health;
pub mod notifications;

pub use health::*;
