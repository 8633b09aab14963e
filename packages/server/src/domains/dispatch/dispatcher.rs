//! Patient-facing dispatch actions - proximity search and request creation
//!
//! Actions are async functions called directly from route handlers. They do
//! the work against the directory and return domain results; HTTP mapping
//! stays at the edge.

use tracing::{info, warn};

use super::error::DispatchError;
use super::geo::{self, Coordinates, NearbyAmbulance, NearbyQuery};
use super::models::request::DispatchRequest;
use crate::common::{AmbulanceId, UserId};
use crate::kernel::ServerDeps;

/// Rank available ambulances by distance from the patient's position.
///
/// Works on a snapshot of the fleet; an ambulance can go off-shift between
/// this search and the follow-up request, which is why `create_request`
/// re-checks availability.
pub async fn nearby_ambulances(
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    limit: i64,
    deps: &ServerDeps,
) -> Result<Vec<NearbyAmbulance>, DispatchError> {
    let origin = Coordinates::new(latitude, longitude)?;
    let query = NearbyQuery::new(origin, radius_km, limit)?;

    let candidates = deps.directory.available_ambulances().await?;
    let matches = geo::find_nearby(&query, candidates);

    info!(
        matched = matches.len(),
        radius_km, "Proximity search completed"
    );

    Ok(matches)
}

/// Create a pending dispatch request for a specific ambulance and notify its
/// operator.
///
/// The availability check here is advisory: it catches the common stale-list
/// case early, while the accept transition re-verifies under a transaction.
/// Operator notification is best-effort; the crew also sees the request via
/// the pending queue.
pub async fn create_request(
    patient: UserId,
    patient_contact: &str,
    ambulance_id: AmbulanceId,
    latitude: f64,
    longitude: f64,
    deps: &ServerDeps,
) -> Result<DispatchRequest, DispatchError> {
    let location = Coordinates::new(latitude, longitude)?;

    let ambulance = deps
        .directory
        .ambulance(ambulance_id)
        .await?
        .ok_or(DispatchError::NotFound("ambulance"))?;

    if !ambulance.is_available {
        return Err(DispatchError::Conflict(
            "ambulance is not available".to_string(),
        ));
    }

    let request = DispatchRequest::new(patient, patient_contact, ambulance_id, location);
    let request = deps.directory.insert_request(&request).await?;

    info!(
        request_id = %request.id,
        ambulance_id = %ambulance_id,
        "Dispatch request created"
    );

    let body = format!(
        "Patient {} requested an ambulance. Location: {}, {}. Directions: {}",
        request.patient_contact,
        latitude,
        longitude,
        geo::directions_link(location)
    );
    if let Err(e) = deps
        .notifier
        .notify(
            ambulance.operator_id,
            None,
            "Ambulance Request",
            &body,
            "dispatch",
        )
        .await
    {
        warn!(
            error = %e,
            request_id = %request.id,
            "Failed to notify operator of new dispatch request"
        );
    }

    Ok(request)
}
