//! Postgres-backed directory implementation.
//!
//! All SQL lives in the model modules; this type routes trait calls to them
//! with the shared pool.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::BaseDirectory;
use crate::common::{AmbulanceId, DispatchRequestId, NotificationId, UserId};
use crate::domains::ambulances::models::ambulance::Ambulance;
use crate::domains::dispatch::models::request::DispatchRequest;
use crate::domains::notifications::models::notification::Notification;

#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseDirectory for PgDirectory {
    async fn insert_ambulance(&self, ambulance: &Ambulance) -> Result<Ambulance> {
        ambulance.insert(&self.pool).await
    }

    async fn ambulance(&self, id: AmbulanceId) -> Result<Option<Ambulance>> {
        Ambulance::find_by_id(id, &self.pool).await
    }

    async fn ambulance_for_operator(&self, operator_id: UserId) -> Result<Option<Ambulance>> {
        Ambulance::find_by_operator(operator_id, &self.pool).await
    }

    async fn ambulance_by_number(&self, ambulance_number: &str) -> Result<Option<Ambulance>> {
        Ambulance::find_by_number(ambulance_number, &self.pool).await
    }

    async fn available_ambulances(&self) -> Result<Vec<Ambulance>> {
        Ambulance::find_available_with_location(&self.pool).await
    }

    async fn record_location(
        &self,
        id: AmbulanceId,
        latitude: f64,
        longitude: f64,
        available: Option<bool>,
    ) -> Result<Option<Ambulance>> {
        Ambulance::record_location(id, latitude, longitude, available, &self.pool).await
    }

    async fn set_availability(
        &self,
        id: AmbulanceId,
        available: bool,
    ) -> Result<Option<(Ambulance, u64)>> {
        if available {
            Ambulance::restore_and_clear_requests(id, &self.pool).await
        } else {
            let ambulance = Ambulance::set_unavailable(id, &self.pool).await?;
            Ok(ambulance.map(|ambulance| (ambulance, 0)))
        }
    }

    async fn insert_request(&self, request: &DispatchRequest) -> Result<DispatchRequest> {
        request.insert(&self.pool).await
    }

    async fn request(&self, id: DispatchRequestId) -> Result<Option<DispatchRequest>> {
        DispatchRequest::find_by_id(id, &self.pool).await
    }

    async fn pending_requests_for(
        &self,
        ambulance_id: AmbulanceId,
    ) -> Result<Vec<DispatchRequest>> {
        DispatchRequest::find_pending_for(ambulance_id, &self.pool).await
    }

    async fn accept_pending(
        &self,
        id: DispatchRequestId,
        ambulance_id: AmbulanceId,
    ) -> Result<Option<DispatchRequest>> {
        DispatchRequest::accept_pending(id, ambulance_id, &self.pool).await
    }

    async fn reject_pending(
        &self,
        id: DispatchRequestId,
        ambulance_id: AmbulanceId,
    ) -> Result<Option<DispatchRequest>> {
        DispatchRequest::reject_pending(id, ambulance_id, &self.pool).await
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<Notification> {
        notification.insert(&self.pool).await
    }

    async fn notifications_for(
        &self,
        recipient: UserId,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        Notification::find_for_recipient(recipient, unread_only, limit, &self.pool).await
    }

    async fn mark_notification_read(
        &self,
        recipient: UserId,
        id: NotificationId,
    ) -> Result<Option<Notification>> {
        Notification::mark_read(recipient, id, &self.pool).await
    }
}
