// Business domains
pub mod ambulances;
pub mod auth;
pub mod dispatch;
pub mod notifications;
