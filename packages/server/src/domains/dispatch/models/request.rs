use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{AmbulanceId, DispatchRequestId, UserId};
use crate::domains::dispatch::geo::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "dispatch_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// A patient's request for a specific ambulance.
///
/// The patient's contact and location are snapshotted at creation time so the
/// crew sees what the patient sent, even if the account changes later.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DispatchRequest {
    pub id: DispatchRequestId,
    pub ambulance_id: AmbulanceId,
    pub patient_id: UserId,
    pub patient_contact: String,
    pub patient_latitude: f64,
    pub patient_longitude: f64,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl DispatchRequest {
    pub fn new(
        patient_id: UserId,
        patient_contact: &str,
        ambulance_id: AmbulanceId,
        location: Coordinates,
    ) -> Self {
        Self {
            id: DispatchRequestId::new(),
            ambulance_id,
            patient_id,
            patient_contact: patient_contact.to_string(),
            patient_latitude: location.latitude,
            patient_longitude: location.longitude,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn patient_location(&self) -> Coordinates {
        Coordinates {
            latitude: self.patient_latitude,
            longitude: self.patient_longitude,
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl DispatchRequest {
    /// Insert a new dispatch request
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, DispatchRequest>(
            r#"
            INSERT INTO dispatch_requests (
                id, ambulance_id, patient_id, patient_contact,
                patient_latitude, patient_longitude, status, created_at, resolved_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.ambulance_id)
        .bind(self.patient_id)
        .bind(&self.patient_contact)
        .bind(self.patient_latitude)
        .bind(self.patient_longitude)
        .bind(self.status)
        .bind(self.created_at)
        .bind(self.resolved_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Find request by ID
    pub async fn find_by_id(id: DispatchRequestId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, DispatchRequest>("SELECT * FROM dispatch_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Pending requests routed to an ambulance, newest first
    pub async fn find_pending_for(
        ambulance_id: AmbulanceId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, DispatchRequest>(
            r#"
            SELECT * FROM dispatch_requests
            WHERE ambulance_id = $1 AND status = 'pending'
            ORDER BY created_at DESC
            "#,
        )
        .bind(ambulance_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Atomically accept a pending request and claim the ambulance.
    ///
    /// The request flips to accepted only while it is still pending AND the
    /// ambulance is still available; both writes land or neither. Rolling back
    /// on a failed claim leaves the request pending, so a competing request on
    /// the same ambulance is not consumed by a lost race.
    ///
    /// Returns `None` when the compare-and-set did not go through (request
    /// missing, not routed to this ambulance, already resolved, or ambulance
    /// already claimed); the caller decides how to classify the failure.
    pub async fn accept_pending(
        id: DispatchRequestId,
        ambulance_id: AmbulanceId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let mut tx = pool.begin().await?;

        let accepted = sqlx::query_as::<_, DispatchRequest>(
            r#"
            WITH resolved AS (
                UPDATE dispatch_requests
                SET status = 'accepted', resolved_at = NOW()
                WHERE id = $1 AND ambulance_id = $2 AND status = 'pending'
                RETURNING *
            ),
            claimed AS (
                UPDATE ambulances a
                SET is_available = false, last_updated = NOW()
                FROM resolved r
                WHERE a.id = r.ambulance_id AND a.is_available = true
                RETURNING a.id
            )
            SELECT r.* FROM resolved r
            INNER JOIN claimed c ON c.id = r.ambulance_id
            "#,
        )
        .bind(id)
        .bind(ambulance_id)
        .fetch_optional(&mut *tx)
        .await?;

        match accepted {
            Some(request) => {
                tx.commit().await?;
                Ok(Some(request))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    /// Decline a pending request. Availability is untouched.
    ///
    /// Returns `None` when the request is missing, routed elsewhere, or no
    /// longer pending.
    pub async fn reject_pending(
        id: DispatchRequestId,
        ambulance_id: AmbulanceId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, DispatchRequest>(
            r#"
            UPDATE dispatch_requests
            SET status = 'rejected', resolved_at = NOW()
            WHERE id = $1 AND ambulance_id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(ambulance_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}
