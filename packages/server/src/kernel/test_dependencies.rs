// TestDependencies - in-memory implementations for testing
//
// Provides directory/notifier doubles that can be injected into ServerDeps
// for tests. The in-memory directory mirrors the conditional-write semantics
// of the Postgres implementation (single lock = single transaction), so
// lifecycle tests exercise the same race outcomes without a database.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use super::deps::ServerDeps;
use super::traits::{BaseDirectory, BaseNotifier};
use crate::common::{AmbulanceId, DispatchRequestId, NotificationId, UserId};
use crate::domains::ambulances::models::ambulance::Ambulance;
use crate::domains::auth::{JwtService, UserRole};
use crate::domains::dispatch::models::request::{DispatchRequest, RequestStatus};
use crate::domains::notifications::models::notification::Notification;

// =============================================================================
// In-memory Directory
// =============================================================================

#[derive(Default)]
struct DirectoryState {
    ambulances: Vec<Ambulance>,
    requests: Vec<DispatchRequest>,
    notifications: Vec<Notification>,
}

/// In-memory `BaseDirectory` with the same compare-and-set behavior as the
/// Postgres directory. One mutex guards all state, so each trait call is
/// atomic the way each SQL transaction is.
pub struct InMemoryDirectory {
    state: Mutex<DirectoryState>,
    failing: bool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DirectoryState::default()),
            failing: false,
        }
    }

    /// A directory where every call fails, for storage-outage tests.
    pub fn failing() -> Self {
        Self {
            state: Mutex::new(DirectoryState::default()),
            failing: true,
        }
    }

    fn check_online(&self) -> Result<()> {
        if self.failing {
            anyhow::bail!("directory offline");
        }
        Ok(())
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseDirectory for InMemoryDirectory {
    async fn insert_ambulance(&self, ambulance: &Ambulance) -> Result<Ambulance> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        state.ambulances.push(ambulance.clone());
        Ok(ambulance.clone())
    }

    async fn ambulance(&self, id: AmbulanceId) -> Result<Option<Ambulance>> {
        self.check_online()?;
        let state = self.state.lock().unwrap();
        Ok(state.ambulances.iter().find(|a| a.id == id).cloned())
    }

    async fn ambulance_for_operator(&self, operator_id: UserId) -> Result<Option<Ambulance>> {
        self.check_online()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .ambulances
            .iter()
            .find(|a| a.operator_id == operator_id)
            .cloned())
    }

    async fn ambulance_by_number(&self, ambulance_number: &str) -> Result<Option<Ambulance>> {
        self.check_online()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .ambulances
            .iter()
            .find(|a| a.ambulance_number == ambulance_number)
            .cloned())
    }

    async fn available_ambulances(&self) -> Result<Vec<Ambulance>> {
        self.check_online()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .ambulances
            .iter()
            .filter(|a| a.is_available && a.location().is_some())
            .cloned()
            .collect())
    }

    async fn record_location(
        &self,
        id: AmbulanceId,
        latitude: f64,
        longitude: f64,
        available: Option<bool>,
    ) -> Result<Option<Ambulance>> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        let Some(ambulance) = state.ambulances.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        ambulance.current_latitude = Some(latitude);
        ambulance.current_longitude = Some(longitude);
        if let Some(available) = available {
            ambulance.is_available = available;
        }
        ambulance.last_updated = Some(Utc::now());
        Ok(Some(ambulance.clone()))
    }

    async fn set_availability(
        &self,
        id: AmbulanceId,
        available: bool,
    ) -> Result<Option<(Ambulance, u64)>> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        let Some(position) = state.ambulances.iter().position(|a| a.id == id) else {
            return Ok(None);
        };

        let mut cleared = 0;
        if available {
            // Same sweep as the SQL path: drop pending and accepted rows,
            // report only the pending ones.
            cleared = state
                .requests
                .iter()
                .filter(|r| r.ambulance_id == id && r.status == RequestStatus::Pending)
                .count() as u64;
            state.requests.retain(|r| {
                r.ambulance_id != id
                    || !matches!(r.status, RequestStatus::Pending | RequestStatus::Accepted)
            });
        }

        let ambulance = &mut state.ambulances[position];
        ambulance.is_available = available;
        ambulance.last_updated = Some(Utc::now());
        Ok(Some((ambulance.clone(), cleared)))
    }

    async fn insert_request(&self, request: &DispatchRequest) -> Result<DispatchRequest> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        Ok(request.clone())
    }

    async fn request(&self, id: DispatchRequestId) -> Result<Option<DispatchRequest>> {
        self.check_online()?;
        let state = self.state.lock().unwrap();
        Ok(state.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn pending_requests_for(
        &self,
        ambulance_id: AmbulanceId,
    ) -> Result<Vec<DispatchRequest>> {
        self.check_online()?;
        let state = self.state.lock().unwrap();
        let mut pending: Vec<DispatchRequest> = state
            .requests
            .iter()
            .filter(|r| r.ambulance_id == ambulance_id && r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn accept_pending(
        &self,
        id: DispatchRequestId,
        ambulance_id: AmbulanceId,
    ) -> Result<Option<DispatchRequest>> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();

        let Some(position) = state.requests.iter().position(|r| {
            r.id == id && r.ambulance_id == ambulance_id && r.status == RequestStatus::Pending
        }) else {
            return Ok(None);
        };

        // Claim the ambulance first; if it is already taken the request is
        // left pending, matching the SQL transaction's rollback.
        let Some(ambulance) = state
            .ambulances
            .iter_mut()
            .find(|a| a.id == ambulance_id && a.is_available)
        else {
            return Ok(None);
        };
        ambulance.is_available = false;
        ambulance.last_updated = Some(Utc::now());

        let request = &mut state.requests[position];
        request.status = RequestStatus::Accepted;
        request.resolved_at = Some(Utc::now());
        Ok(Some(request.clone()))
    }

    async fn reject_pending(
        &self,
        id: DispatchRequestId,
        ambulance_id: AmbulanceId,
    ) -> Result<Option<DispatchRequest>> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        let Some(request) = state.requests.iter_mut().find(|r| {
            r.id == id && r.ambulance_id == ambulance_id && r.status == RequestStatus::Pending
        }) else {
            return Ok(None);
        };
        request.status = RequestStatus::Rejected;
        request.resolved_at = Some(Utc::now());
        Ok(Some(request.clone()))
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<Notification> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        state.notifications.push(notification.clone());
        Ok(notification.clone())
    }

    async fn notifications_for(
        &self,
        recipient: UserId,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        self.check_online()?;
        let state = self.state.lock().unwrap();
        let mut notifications: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications.truncate(limit as usize);
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        recipient: UserId,
        id: NotificationId,
    ) -> Result<Option<Notification>> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient)
        else {
            return Ok(None);
        };
        notification.is_read = true;
        Ok(Some(notification.clone()))
    }
}

// =============================================================================
// Mock Notifier
// =============================================================================

/// A notification captured by the mock notifier
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub recipient: UserId,
    pub contact_email: Option<String>,
    pub title: String,
    pub body: String,
    pub category: String,
}

pub struct MockNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    failing: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: false,
        }
    }

    /// A notifier where every delivery fails, for best-effort-path tests.
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: true,
        }
    }

    /// Get all notifications that were sent
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    /// Check if a notification was sent with the given title
    pub fn was_sent_with_title(&self, title: &str) -> bool {
        self.sent.lock().unwrap().iter().any(|n| n.title == title)
    }

    /// Get all notifications sent to a recipient
    pub fn sent_to(&self, recipient: UserId) -> Vec<SentNotification> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotifier for MockNotifier {
    async fn notify(
        &self,
        recipient: UserId,
        contact_email: Option<&str>,
        title: &str,
        body: &str,
        category: &str,
    ) -> Result<()> {
        if self.failing {
            anyhow::bail!("notifier offline");
        }
        self.sent.lock().unwrap().push(SentNotification {
            recipient,
            contact_email: contact_email.map(str::to_string),
            title: title.to_string(),
            body: body.to_string(),
            category: category.to_string(),
        });
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub directory: Arc<InMemoryDirectory>,
    pub notifier: Arc<MockNotifier>,
    pub jwt_service: Arc<JwtService>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            directory: Arc::new(InMemoryDirectory::new()),
            notifier: Arc::new(MockNotifier::new()),
            jwt_service: Arc::new(JwtService::new("test_secret_key", "test_issuer".to_string())),
        }
    }

    /// Set a directory double
    pub fn mock_directory(mut self, directory: InMemoryDirectory) -> Self {
        self.directory = Arc::new(directory);
        self
    }

    /// Set a notifier double
    pub fn mock_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Mint a bearer token the way the identity service would
    pub fn token(&self, user_id: UserId, email: &str, role: UserRole) -> String {
        self.jwt_service
            .create_token(user_id, email.to_string(), role)
            .expect("token creation should not fail in tests")
    }

    /// Convert into ServerDeps for testing
    pub fn into_deps(self) -> ServerDeps {
        ServerDeps::new(self.directory, self.notifier, self.jwt_service)
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
