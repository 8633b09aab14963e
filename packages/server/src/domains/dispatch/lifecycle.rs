//! Crew-facing lifecycle actions - resolving requests and managing availability
//!
//! A request moves `Pending -> Accepted | Rejected` exactly once; the
//! ambulance moves out of the pool on accept and back in on mission
//! completion. Every transition goes through a conditional write in the
//! directory, so concurrent crews cannot double-resolve a request or
//! double-claim an ambulance.

use tracing::{info, warn};

use super::error::DispatchError;
use super::geo::{self, Coordinates};
use super::models::request::{DispatchRequest, RequestStatus};
use crate::common::{AmbulanceId, DispatchRequestId, UserId};
use crate::domains::ambulances::access::{authorize_operator, OperatorAccess};
use crate::domains::ambulances::models::ambulance::Ambulance;
use crate::kernel::ServerDeps;

/// Result of an availability flip: the updated profile plus how many pending
/// requests were discarded when the ambulance came back into the pool.
#[derive(Debug, Clone)]
pub struct AvailabilityUpdate {
    pub ambulance: Ambulance,
    pub cleared_requests: u64,
}

/// Accept a pending request on behalf of the operator's ambulance.
///
/// The accept claims the ambulance in the same transaction; of two crews (or
/// two requests) racing for the same ambulance, exactly one wins and the
/// loser sees a conflict. The patient is notified best-effort on success.
pub async fn accept_request(
    request_id: DispatchRequestId,
    operator: UserId,
    deps: &ServerDeps,
) -> Result<DispatchRequest, DispatchError> {
    let ambulance = deps
        .directory
        .ambulance_for_operator(operator)
        .await?
        .ok_or(DispatchError::NotFound("ambulance"))?;

    let Some(request) = deps
        .directory
        .accept_pending(request_id, ambulance.id)
        .await?
    else {
        return Err(unresolved_error(request_id, ambulance.id, deps).await);
    };

    info!(
        request_id = %request.id,
        ambulance_id = %ambulance.id,
        "Dispatch request accepted"
    );

    let body = format!(
        "Ambulance {} accepted your request and is on the way. Driver: {} {}. Directions: {}",
        ambulance.ambulance_number,
        ambulance.driver_name,
        ambulance.driver_phone,
        geo::directions_link(request.patient_location())
    );
    if let Err(e) = deps
        .notifier
        .notify(
            request.patient_id,
            Some(&request.patient_contact),
            "Ambulance Request Accepted",
            &body,
            "dispatch",
        )
        .await
    {
        warn!(error = %e, request_id = %request.id, "Failed to notify patient of acceptance");
    }

    Ok(request)
}

/// Decline a pending request on behalf of the operator's ambulance.
///
/// Availability is untouched: a crew that turns one patient down stays in the
/// pool for others.
pub async fn decline_request(
    request_id: DispatchRequestId,
    operator: UserId,
    deps: &ServerDeps,
) -> Result<DispatchRequest, DispatchError> {
    let ambulance = deps
        .directory
        .ambulance_for_operator(operator)
        .await?
        .ok_or(DispatchError::NotFound("ambulance"))?;

    let Some(request) = deps
        .directory
        .reject_pending(request_id, ambulance.id)
        .await?
    else {
        return Err(unresolved_error(request_id, ambulance.id, deps).await);
    };

    info!(
        request_id = %request.id,
        ambulance_id = %ambulance.id,
        "Dispatch request declined"
    );

    if let Err(e) = deps
        .notifier
        .notify(
            request.patient_id,
            Some(&request.patient_contact),
            "Ambulance Request Rejected",
            "Your ambulance request was rejected. Please try another ambulance.",
            "dispatch",
        )
        .await
    {
        warn!(error = %e, request_id = %request.id, "Failed to notify patient of rejection");
    }

    Ok(request)
}

/// List requests still awaiting a decision from the operator's crew, newest
/// first.
pub async fn pending_requests(
    operator: UserId,
    deps: &ServerDeps,
) -> Result<Vec<DispatchRequest>, DispatchError> {
    let ambulance = deps
        .directory
        .ambulance_for_operator(operator)
        .await?
        .ok_or(DispatchError::NotFound("ambulance"))?;

    let requests = deps.directory.pending_requests_for(ambulance.id).await?;
    Ok(requests)
}

/// Mark the mission done: the ambulance returns to the dispatchable pool.
pub async fn complete_mission(
    operator: UserId,
    ambulance_id: AmbulanceId,
    deps: &ServerDeps,
) -> Result<AvailabilityUpdate, DispatchError> {
    update_availability(operator, ambulance_id, true, deps).await
}

/// Manual availability override from the crew.
///
/// Returning to the pool discards requests still routed to the ambulance and
/// reports how many pending ones were dropped.
pub async fn update_availability(
    operator: UserId,
    ambulance_id: AmbulanceId,
    available: bool,
    deps: &ServerDeps,
) -> Result<AvailabilityUpdate, DispatchError> {
    let ambulance = authorize(operator, ambulance_id, deps).await?;

    // TODO: the restore path deletes still-pending requests outright; moving
    // them to an 'expired' terminal status instead would keep an audit trail
    // for patients who are still polling their request.
    let (ambulance, cleared_requests) = deps
        .directory
        .set_availability(ambulance.id, available)
        .await?
        .ok_or(DispatchError::NotFound("ambulance"))?;

    info!(
        ambulance_id = %ambulance.id,
        available,
        cleared_requests,
        "Availability updated"
    );

    Ok(AvailabilityUpdate {
        ambulance,
        cleared_requests,
    })
}

/// Record a position report from the crew, optionally flipping availability
/// in the same call.
pub async fn report_location(
    operator: UserId,
    ambulance_id: AmbulanceId,
    latitude: f64,
    longitude: f64,
    available: Option<bool>,
    deps: &ServerDeps,
) -> Result<Ambulance, DispatchError> {
    Coordinates::new(latitude, longitude)?;

    let ambulance = authorize(operator, ambulance_id, deps).await?;

    let updated = deps
        .directory
        .record_location(ambulance.id, latitude, longitude, available)
        .await?
        .ok_or(DispatchError::NotFound("ambulance"))?;

    info!(ambulance_id = %updated.id, "Position report recorded");

    Ok(updated)
}

/// Map an ownership check onto dispatch errors.
///
/// Acting on somebody else's ambulance reads as a conflict, not a forbidden:
/// the response must not confirm that the target id exists.
async fn authorize(
    operator: UserId,
    ambulance_id: AmbulanceId,
    deps: &ServerDeps,
) -> Result<Ambulance, DispatchError> {
    match authorize_operator(deps.directory.as_ref(), operator, ambulance_id).await? {
        OperatorAccess::Authorized(ambulance) => Ok(ambulance),
        OperatorAccess::NotFound => Err(DispatchError::NotFound("ambulance")),
        OperatorAccess::Forbidden => Err(DispatchError::Conflict(
            "ambulance is not operated by this account".to_string(),
        )),
    }
}

/// Work out why a conditional resolution matched nothing.
///
/// A request routed to somebody else's ambulance reads as missing, never as
/// forbidden. A request that is still pending and ours means the accept lost
/// the ambulance claim itself (decline cannot reach that state).
async fn unresolved_error(
    request_id: DispatchRequestId,
    own_ambulance: AmbulanceId,
    deps: &ServerDeps,
) -> DispatchError {
    match deps.directory.request(request_id).await {
        Err(e) => DispatchError::StorageUnavailable(e),
        Ok(None) => DispatchError::NotFound("request"),
        Ok(Some(request)) if request.ambulance_id != own_ambulance => {
            DispatchError::NotFound("request")
        }
        Ok(Some(request)) if request.status != RequestStatus::Pending => {
            DispatchError::Conflict("request already resolved".to_string())
        }
        Ok(Some(_)) => DispatchError::Conflict("ambulance already dispatched".to_string()),
    }
}
