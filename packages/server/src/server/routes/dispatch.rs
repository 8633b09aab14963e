//! Dispatch endpoints - proximity search and the request lifecycle

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::common::{AmbulanceId, DispatchRequestId};
use crate::domains::dispatch::geo::{self, NearbyAmbulance};
use crate::domains::dispatch::{dispatcher, lifecycle, DispatchRequest};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::{require_user, AuthUser, ClientIp};

#[derive(Debug, Deserialize)]
pub struct NearbyPayload {
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_radius_km() -> f64 {
    geo::DEFAULT_RADIUS_KM
}

fn default_limit() -> i64 {
    geo::DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct RequestPayload {
    pub patient_lat: f64,
    pub patient_lon: f64,
}

/// POST /nearby
///
/// Rank available ambulances by distance from the given position. Open to
/// unauthenticated callers; a bystander should be able to search before
/// signing in.
pub async fn nearby_handler(
    Extension(state): Extension<AppState>,
    Json(payload): Json<NearbyPayload>,
) -> Result<Json<Vec<NearbyAmbulance>>, ApiError> {
    let matches = dispatcher::nearby_ambulances(
        payload.lat,
        payload.lon,
        payload.radius_km,
        payload.limit,
        &state.deps,
    )
    .await?;

    Ok(Json(matches))
}

/// POST /ambulances/:id/request
///
/// Create a pending dispatch request for the chosen ambulance. The patient
/// contact recorded on the request comes from the token, never the payload.
pub async fn create_request_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    client_ip: Option<Extension<ClientIp>>,
    Path(ambulance_id): Path<AmbulanceId>,
    Json(payload): Json<RequestPayload>,
) -> Result<(StatusCode, Json<DispatchRequest>), ApiError> {
    let user = require_user(auth)?;

    // Incident audit trail: who asked for help, and from where.
    if let Some(Extension(ClientIp(ip))) = client_ip {
        info!(%ip, ambulance_id = %ambulance_id, "Dispatch request received");
    }

    let request = dispatcher::create_request(
        user.user_id,
        &user.email,
        ambulance_id,
        payload.patient_lat,
        payload.patient_lon,
        &state.deps,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /requests/:id/accept
pub async fn accept_request_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(request_id): Path<DispatchRequestId>,
) -> Result<Json<DispatchRequest>, ApiError> {
    let user = require_user(auth)?;
    let request = lifecycle::accept_request(request_id, user.user_id, &state.deps).await?;
    Ok(Json(request))
}

/// POST /requests/:id/decline
pub async fn decline_request_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(request_id): Path<DispatchRequestId>,
) -> Result<Json<DispatchRequest>, ApiError> {
    let user = require_user(auth)?;
    let request = lifecycle::decline_request(request_id, user.user_id, &state.deps).await?;
    Ok(Json(request))
}

/// GET /requests/pending
///
/// Requests still awaiting a decision from the caller's crew, newest first.
pub async fn pending_requests_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<DispatchRequest>>, ApiError> {
    let user = require_user(auth)?;
    let requests = lifecycle::pending_requests(user.user_id, &state.deps).await?;
    Ok(Json(requests))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_payload_defaults() {
        let payload: NearbyPayload =
            serde_json::from_str(r#"{"lat": 6.9271, "lon": 79.8612}"#).unwrap();
        assert_eq!(payload.radius_km, 10.0);
        assert_eq!(payload.limit, 10);
    }

    #[test]
    fn test_nearby_payload_overrides() {
        let payload: NearbyPayload =
            serde_json::from_str(r#"{"lat": 0.0, "lon": 0.0, "radius_km": 25.5, "limit": 3}"#)
                .unwrap();
        assert_eq!(payload.radius_km, 25.5);
        assert_eq!(payload.limit, 3);
    }
}
