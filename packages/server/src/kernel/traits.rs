// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like "accept a request") should be domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseDirectory, BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{AmbulanceId, DispatchRequestId, NotificationId, UserId};
use crate::domains::ambulances::models::ambulance::Ambulance;
use crate::domains::dispatch::models::request::DispatchRequest;
use crate::domains::notifications::models::notification::Notification;

// =============================================================================
// Directory Trait (Infrastructure - fleet, request and inbox storage)
// =============================================================================

/// Storage access for ambulances, dispatch requests and notifications.
///
/// Lookups return `Ok(None)` for missing rows; `Err` always means the store
/// itself failed, so callers can map it to a 503 without guessing.
#[async_trait]
pub trait BaseDirectory: Send + Sync {
    // --- Ambulances ---

    /// Persist a new ambulance profile
    async fn insert_ambulance(&self, ambulance: &Ambulance) -> Result<Ambulance>;

    /// Look up an ambulance by ID
    async fn ambulance(&self, id: AmbulanceId) -> Result<Option<Ambulance>>;

    /// Look up the ambulance operated by an account
    async fn ambulance_for_operator(&self, operator_id: UserId) -> Result<Option<Ambulance>>;

    /// Look up an ambulance by its fleet number
    async fn ambulance_by_number(&self, ambulance_number: &str) -> Result<Option<Ambulance>>;

    /// All ambulances that are available and have a reported location
    async fn available_ambulances(&self) -> Result<Vec<Ambulance>>;

    /// Store a position report, optionally flipping availability in the same
    /// write. `None` when the ambulance doesn't exist.
    async fn record_location(
        &self,
        id: AmbulanceId,
        latitude: f64,
        longitude: f64,
        available: Option<bool>,
    ) -> Result<Option<Ambulance>>;

    /// Flip availability. Restoring availability also discards requests still
    /// routed to the ambulance; the count of discarded pending requests is
    /// returned alongside the updated row.
    async fn set_availability(
        &self,
        id: AmbulanceId,
        available: bool,
    ) -> Result<Option<(Ambulance, u64)>>;

    // --- Dispatch requests ---

    /// Persist a new dispatch request
    async fn insert_request(&self, request: &DispatchRequest) -> Result<DispatchRequest>;

    /// Look up a request by ID
    async fn request(&self, id: DispatchRequestId) -> Result<Option<DispatchRequest>>;

    /// Pending requests routed to an ambulance, newest first
    async fn pending_requests_for(
        &self,
        ambulance_id: AmbulanceId,
    ) -> Result<Vec<DispatchRequest>>;

    /// Atomically accept a pending request and claim the ambulance.
    /// `None` when the compare-and-set did not go through.
    async fn accept_pending(
        &self,
        id: DispatchRequestId,
        ambulance_id: AmbulanceId,
    ) -> Result<Option<DispatchRequest>>;

    /// Decline a pending request without touching availability.
    /// `None` when the request is missing, routed elsewhere, or resolved.
    async fn reject_pending(
        &self,
        id: DispatchRequestId,
        ambulance_id: AmbulanceId,
    ) -> Result<Option<DispatchRequest>>;

    // --- Notifications ---

    /// Persist a new inbox notification
    async fn insert_notification(&self, notification: &Notification) -> Result<Notification>;

    /// A user's notifications, newest first
    async fn notifications_for(
        &self,
        recipient: UserId,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>>;

    /// Mark one of the recipient's notifications read.
    /// `None` when it doesn't exist or belongs to someone else.
    async fn mark_notification_read(
        &self,
        recipient: UserId,
        id: NotificationId,
    ) -> Result<Option<Notification>>;
}

// =============================================================================
// Notifier Trait (Infrastructure - user-facing delivery)
// =============================================================================

/// Delivery of dispatch notifications to users.
///
/// Implementations decide the channels (inbox row, email, both). Failures are
/// reported to the caller, but dispatch flows treat delivery as best-effort:
/// a failed notification never fails the operation that triggered it.
#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Notify a user. `contact_email` routes an additional email copy when an
    /// address is known for the recipient.
    async fn notify(
        &self,
        recipient: UserId,
        contact_email: Option<&str>,
        title: &str,
        body: &str,
        category: &str,
    ) -> Result<()>;
}
