//! Ambulance endpoints - registration, profile, position and availability

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::AmbulanceId;
use crate::domains::ambulances::actions::{my_ambulance, register_ambulance};
use crate::domains::ambulances::Ambulance;
use crate::domains::dispatch::lifecycle::{self, AvailabilityUpdate};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::{require_user, AuthUser};

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub ambulance_number: String,
    pub driver_name: String,
    pub driver_phone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LocationPayload {
    pub lat: f64,
    pub lon: f64,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityPayload {
    pub available: bool,
}

/// POST /ambulances/register
///
/// Create the caller's ambulance profile. One per operator account.
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<Ambulance>), ApiError> {
    let user = require_user(auth)?;

    let ambulance = register_ambulance(
        user.user_id,
        &payload.ambulance_number,
        &payload.driver_name,
        &payload.driver_phone,
        payload.latitude,
        payload.longitude,
        &state.deps,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ambulance)))
}

/// GET /ambulances/me
pub async fn my_ambulance_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Ambulance>, ApiError> {
    let user = require_user(auth)?;
    let ambulance = my_ambulance(user.user_id, &state.deps).await?;
    Ok(Json(ambulance))
}

/// POST /ambulances/:id/location
///
/// Record a position report, optionally flipping availability in the same
/// call.
pub async fn report_location_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(ambulance_id): Path<AmbulanceId>,
    Json(payload): Json<LocationPayload>,
) -> Result<Json<Ambulance>, ApiError> {
    let user = require_user(auth)?;

    let ambulance = lifecycle::report_location(
        user.user_id,
        ambulance_id,
        payload.lat,
        payload.lon,
        payload.is_available,
        &state.deps,
    )
    .await?;

    Ok(Json(ambulance))
}

/// POST /ambulances/:id/availability
pub async fn update_availability_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(ambulance_id): Path<AmbulanceId>,
    Json(payload): Json<AvailabilityPayload>,
) -> Result<Json<Value>, ApiError> {
    let user = require_user(auth)?;

    let update =
        lifecycle::update_availability(user.user_id, ambulance_id, payload.available, &state.deps)
            .await?;

    Ok(Json(availability_body(&update)))
}

/// POST /ambulances/:id/complete-mission
///
/// Mission done: the ambulance returns to the dispatchable pool and any
/// requests still routed to it are discarded.
pub async fn complete_mission_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(ambulance_id): Path<AmbulanceId>,
) -> Result<Json<Value>, ApiError> {
    let user = require_user(auth)?;

    let update = lifecycle::complete_mission(user.user_id, ambulance_id, &state.deps).await?;

    Ok(Json(availability_body(&update)))
}

fn availability_body(update: &AvailabilityUpdate) -> Value {
    json!({
        "available": update.ambulance.is_available,
        "cleared_requests": update.cleared_requests,
    })
}
