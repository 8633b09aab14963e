use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{AmbulanceId, UserId};
use crate::domains::dispatch::geo::Coordinates;

/// A registered ambulance profile.
///
/// Each operator account owns at most one ambulance. Location is optional
/// until the crew reports it; an ambulance without a location never appears
/// in proximity results.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ambulance {
    pub id: AmbulanceId,
    pub operator_id: UserId,
    pub ambulance_number: String,
    pub driver_name: String,
    pub driver_phone: String,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub is_available: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Ambulance {
    /// Build a new profile. Newly registered ambulances start available;
    /// `last_updated` is only stamped when an initial location is supplied.
    pub fn new(
        operator_id: UserId,
        ambulance_number: &str,
        driver_name: &str,
        driver_phone: &str,
        location: Option<Coordinates>,
    ) -> Self {
        Self {
            id: AmbulanceId::new(),
            operator_id,
            ambulance_number: ambulance_number.to_string(),
            driver_name: driver_name.to_string(),
            driver_phone: driver_phone.to_string(),
            current_latitude: location.map(|c| c.latitude),
            current_longitude: location.map(|c| c.longitude),
            is_available: true,
            last_updated: location.map(|_| Utc::now()),
            created_at: Utc::now(),
        }
    }

    /// Current position, if the crew has ever reported one.
    pub fn location(&self) -> Option<Coordinates> {
        match (self.current_latitude, self.current_longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Ambulance {
    /// Insert a new ambulance profile
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Ambulance>(
            r#"
            INSERT INTO ambulances (
                id, operator_id, ambulance_number, driver_name, driver_phone,
                current_latitude, current_longitude, is_available, last_updated, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.operator_id)
        .bind(&self.ambulance_number)
        .bind(&self.driver_name)
        .bind(&self.driver_phone)
        .bind(self.current_latitude)
        .bind(self.current_longitude)
        .bind(self.is_available)
        .bind(self.last_updated)
        .bind(self.created_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Find ambulance by ID
    pub async fn find_by_id(id: AmbulanceId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Ambulance>("SELECT * FROM ambulances WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find the ambulance operated by an account (one profile per operator)
    pub async fn find_by_operator(operator_id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Ambulance>("SELECT * FROM ambulances WHERE operator_id = $1")
            .bind(operator_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find ambulance by its fleet number
    pub async fn find_by_number(ambulance_number: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Ambulance>("SELECT * FROM ambulances WHERE ambulance_number = $1")
            .bind(ambulance_number)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// All dispatchable ambulances: available and with a known position.
    pub async fn find_available_with_location(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Ambulance>(
            r#"
            SELECT * FROM ambulances
            WHERE is_available = true
              AND current_latitude IS NOT NULL
              AND current_longitude IS NOT NULL
            ORDER BY created_at
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Record a position report from the crew.
    ///
    /// Optionally flips availability in the same write when the crew sends it
    /// alongside the position. Returns `None` if the ambulance doesn't exist.
    pub async fn record_location(
        id: AmbulanceId,
        latitude: f64,
        longitude: f64,
        available: Option<bool>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Ambulance>(
            r#"
            UPDATE ambulances
            SET current_latitude = $2,
                current_longitude = $3,
                is_available = COALESCE($4, is_available),
                last_updated = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(latitude)
        .bind(longitude)
        .bind(available)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Take the ambulance out of the dispatchable pool.
    pub async fn set_unavailable(id: AmbulanceId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Ambulance>(
            r#"
            UPDATE ambulances
            SET is_available = false,
                last_updated = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Return the ambulance to the dispatchable pool and clear any requests
    /// still routed to it, in one transaction.
    ///
    /// An available ambulance must have no pending or accepted requests, so
    /// both are removed here; the returned count covers only the pending ones
    /// a patient was still waiting on. Returns `None` if the ambulance doesn't
    /// exist.
    pub async fn restore_and_clear_requests(
        id: AmbulanceId,
        pool: &PgPool,
    ) -> Result<Option<(Self, u64)>> {
        let mut tx = pool.begin().await?;

        let ambulance = sqlx::query_as::<_, Ambulance>(
            r#"
            UPDATE ambulances
            SET is_available = true,
                last_updated = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(ambulance) = ambulance else {
            tx.rollback().await?;
            return Ok(None);
        };

        let cleared = sqlx::query_scalar::<_, i64>(
            r#"
            WITH swept AS (
                DELETE FROM dispatch_requests
                WHERE ambulance_id = $1 AND status IN ('pending', 'accepted')
                RETURNING status
            )
            SELECT COUNT(*) FILTER (WHERE status = 'pending') FROM swept
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((ambulance, cleared as u64)))
    }
}
