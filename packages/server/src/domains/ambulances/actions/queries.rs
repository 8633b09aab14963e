//! Ambulance query actions
//!
//! Query actions return data directly; ownership resolution happens here,
//! never from client-supplied ids.

use crate::common::UserId;
use crate::domains::ambulances::models::ambulance::Ambulance;
use crate::domains::dispatch::error::DispatchError;
use crate::kernel::ServerDeps;

/// Get the ambulance profile registered by this operator account.
pub async fn my_ambulance(operator: UserId, deps: &ServerDeps) -> Result<Ambulance, DispatchError> {
    deps.directory
        .ambulance_for_operator(operator)
        .await?
        .ok_or(DispatchError::NotFound("ambulance"))
}
