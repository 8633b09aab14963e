//! Register ambulance action - creates the operator's ambulance profile

use tracing::info;

use crate::common::UserId;
use crate::domains::ambulances::models::ambulance::Ambulance;
use crate::domains::dispatch::error::DispatchError;
use crate::domains::dispatch::geo::Coordinates;
use crate::kernel::ServerDeps;

/// Register a new ambulance for the operator's account.
///
/// One profile per operator and fleet numbers are unique; both rules are
/// checked here and also enforced by database constraints. The profile starts
/// available, with an optional initial position.
pub async fn register_ambulance(
    operator: UserId,
    ambulance_number: &str,
    driver_name: &str,
    driver_phone: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    deps: &ServerDeps,
) -> Result<Ambulance, DispatchError> {
    if ambulance_number.trim().is_empty() {
        return Err(DispatchError::Validation(
            "ambulance_number must not be empty".to_string(),
        ));
    }
    if driver_name.trim().is_empty() || driver_phone.trim().is_empty() {
        return Err(DispatchError::Validation(
            "driver_name and driver_phone must not be empty".to_string(),
        ));
    }

    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)?),
        (None, None) => None,
        _ => {
            return Err(DispatchError::Validation(
                "latitude and longitude must be provided together".to_string(),
            ));
        }
    };

    if deps
        .directory
        .ambulance_for_operator(operator)
        .await?
        .is_some()
    {
        return Err(DispatchError::Conflict(
            "operator already has a registered ambulance".to_string(),
        ));
    }

    if deps
        .directory
        .ambulance_by_number(ambulance_number)
        .await?
        .is_some()
    {
        return Err(DispatchError::Conflict(
            "ambulance number is already registered".to_string(),
        ));
    }

    let ambulance = Ambulance::new(operator, ambulance_number, driver_name, driver_phone, location);
    let ambulance = deps.directory.insert_ambulance(&ambulance).await?;

    info!(
        ambulance_id = %ambulance.id,
        ambulance_number = %ambulance.ambulance_number,
        "Ambulance registered"
    );

    Ok(ambulance)
}
