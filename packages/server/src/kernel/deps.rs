//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! actions. Storage and notification go through trait abstractions so tests
//! can swap in in-memory implementations.

use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::traits::{BaseDirectory, BaseNotifier};

/// Server dependencies accessible to domain actions
#[derive(Clone)]
pub struct ServerDeps {
    pub directory: Arc<dyn BaseDirectory>,
    pub notifier: Arc<dyn BaseNotifier>,
    /// JWT service for token creation and verification
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        directory: Arc<dyn BaseDirectory>,
        notifier: Arc<dyn BaseNotifier>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            directory,
            notifier,
            jwt_service,
        }
    }
}
