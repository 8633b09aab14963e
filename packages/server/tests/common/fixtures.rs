//! Test fixtures for creating test data.
//!
//! Fixtures go through the directory, the same write path the handlers use.

use server_core::common::UserId;
use server_core::domains::ambulances::Ambulance;
use server_core::domains::dispatch::geo::Coordinates;
use server_core::domains::dispatch::DispatchRequest;
use server_core::kernel::{BaseDirectory, InMemoryDirectory};

/// Register an available ambulance at the given position.
pub async fn seed_ambulance(
    directory: &InMemoryDirectory,
    operator: UserId,
    number: &str,
    latitude: f64,
    longitude: f64,
) -> Ambulance {
    let location = Coordinates::new(latitude, longitude).expect("Fixture coordinates are valid");
    let ambulance = Ambulance::new(operator, number, "Test Driver", "+94770000000", Some(location));
    directory
        .insert_ambulance(&ambulance)
        .await
        .expect("Failed to seed ambulance")
}

/// Register an available ambulance with no known position.
pub async fn seed_ambulance_without_location(
    directory: &InMemoryDirectory,
    operator: UserId,
    number: &str,
) -> Ambulance {
    let ambulance = Ambulance::new(operator, number, "Test Driver", "+94770000000", None);
    directory
        .insert_ambulance(&ambulance)
        .await
        .expect("Failed to seed ambulance")
}

/// Create a pending dispatch request routed to the given ambulance.
pub async fn seed_pending_request(
    directory: &InMemoryDirectory,
    patient: UserId,
    ambulance: &Ambulance,
    latitude: f64,
    longitude: f64,
) -> DispatchRequest {
    let location = Coordinates::new(latitude, longitude).expect("Fixture coordinates are valid");
    let request = DispatchRequest::new(patient, "patient@example.com", ambulance.id, location);
    directory
        .insert_request(&request)
        .await
        .expect("Failed to seed dispatch request")
}
