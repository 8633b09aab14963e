//! Integration tests for proximity matching via POST /nearby.
//!
//! Covers ranking, the inclusive radius boundary, rounding, ETA estimates,
//! defaults, and input validation through the full HTTP stack.

mod common;

use crate::common::{
    get, json_body, post_json, seed_ambulance, seed_ambulance_without_location, TestApp,
};
use axum::http::StatusCode;
use serde_json::json;
use server_core::common::UserId;
use server_core::kernel::BaseDirectory;

// =============================================================================
// Matching and ranking
// =============================================================================

/// An ambulance standing at the search origin reports zero distance and ETA.
#[tokio::test]
async fn nearby_at_own_position_is_zero_distance() {
    let app = TestApp::new();
    seed_ambulance(app.directory(), UserId::new(), "AMB-001", 6.9271, 79.8612).await;

    let response = app
        .send(post_json(
            "/nearby",
            None,
            &json!({"lat": 6.9271, "lon": 79.8612}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["distance_km"], 0.0);
    assert_eq!(body[0]["eta_min"], 0);
    assert_eq!(body[0]["ambulance"]["ambulance_number"], "AMB-001");
}

/// Results come back nearest first and truncated to the requested limit.
#[tokio::test]
async fn nearby_ranks_by_distance_and_applies_limit() {
    let app = TestApp::new();
    let directory = app.directory();
    // Offsets in pure latitude: 0.01 deg is ~1.11 km
    seed_ambulance(directory, UserId::new(), "AMB-FAR", 0.06, 0.0).await;
    seed_ambulance(directory, UserId::new(), "AMB-NEAR", 0.01, 0.0).await;
    seed_ambulance(directory, UserId::new(), "AMB-MID", 0.03, 0.0).await;

    let response = app
        .send(post_json(
            "/nearby",
            None,
            &json!({"lat": 0.0, "lon": 0.0, "limit": 2}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[0]["ambulance"]["ambulance_number"], "AMB-NEAR");
    assert_eq!(body[1]["ambulance"]["ambulance_number"], "AMB-MID");
}

/// Membership is decided on the exact distance: ~10.003 km rounds to 10.00
/// but still falls outside a 10 km radius, while ~9.996 km is in.
#[tokio::test]
async fn nearby_radius_boundary_uses_exact_distance() {
    let app = TestApp::new();
    let directory = app.directory();
    seed_ambulance(directory, UserId::new(), "AMB-IN", 0.0899, 0.0).await;
    seed_ambulance(directory, UserId::new(), "AMB-OUT", 0.0899591, 0.0).await;

    let response = app
        .send(post_json(
            "/nearby",
            None,
            &json!({"lat": 0.0, "lon": 0.0, "radius_km": 10.0}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["ambulance"]["ambulance_number"], "AMB-IN");
    // The survivor's rounded distance still reads as the full radius
    assert_eq!(body[0]["distance_km"], 10.0);
    assert_eq!(body[0]["eta_min"], 15);
}

/// An ambulance well past the radius never matches, even when it is the
/// only one in the fleet.
#[tokio::test]
async fn nearby_excludes_an_ambulance_twelve_km_out() {
    let app = TestApp::new();
    // 0.108 deg of latitude is ~12.0 km
    seed_ambulance(app.directory(), UserId::new(), "AMB-FAR", 0.108, 0.0).await;

    let response = app
        .send(post_json(
            "/nearby",
            None,
            &json!({"lat": 0.0, "lon": 0.0, "radius_km": 10.0}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

/// Distances are reported rounded to two decimals, with the ETA computed at
/// 40 km/h from the exact distance.
#[tokio::test]
async fn nearby_reports_rounded_distance_and_eta() {
    let app = TestApp::new();
    // 0.018 deg of latitude is ~2.0015 km
    seed_ambulance(app.directory(), UserId::new(), "AMB-002", 0.018, 0.0).await;

    let response = app
        .send(post_json("/nearby", None, &json!({"lat": 0.0, "lon": 0.0})))
        .await;

    let body = json_body(response).await;
    assert_eq!(body[0]["distance_km"], 2.0);
    assert_eq!(body[0]["eta_min"], 3);
}

/// Off-shift ambulances and those without a reported position never match.
#[tokio::test]
async fn nearby_skips_unavailable_and_unplaced_ambulances() {
    let app = TestApp::new();
    let directory = app.directory();
    seed_ambulance_without_location(directory, UserId::new(), "AMB-NOLOC").await;

    let operator = UserId::new();
    let parked = seed_ambulance(directory, operator, "AMB-PARKED", 0.01, 0.0).await;
    directory
        .set_availability(parked.id, false)
        .await
        .expect("Failed to park ambulance");

    let response = app
        .send(post_json("/nearby", None, &json!({"lat": 0.0, "lon": 0.0})))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

/// Equidistant ambulances come back in ambulance-id order, so repeated
/// searches see the same ranking.
#[tokio::test]
async fn nearby_breaks_ties_by_ambulance_id() {
    let app = TestApp::new();
    let directory = app.directory();
    let a = seed_ambulance(directory, UserId::new(), "AMB-A", 0.02, 0.0).await;
    let b = seed_ambulance(directory, UserId::new(), "AMB-B", 0.02, 0.0).await;

    let (lo, hi) = if a.id < b.id {
        (a.ambulance_number, b.ambulance_number)
    } else {
        (b.ambulance_number, a.ambulance_number)
    };

    let response = app
        .send(post_json("/nearby", None, &json!({"lat": 0.0, "lon": 0.0})))
        .await;

    let body = json_body(response).await;
    assert_eq!(body[0]["ambulance"]["ambulance_number"], lo.as_str());
    assert_eq!(body[1]["ambulance"]["ambulance_number"], hi.as_str());
}

// =============================================================================
// Defaults and validation
// =============================================================================

/// Searching without auth is allowed; searching an empty fleet returns an
/// empty list, not an error.
#[tokio::test]
async fn nearby_with_no_fleet_returns_empty_list() {
    let app = TestApp::new();

    let response = app
        .send(post_json(
            "/nearby",
            None,
            &json!({"lat": 6.9271, "lon": 79.8612}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, json!([]));
}

/// Radius defaults to 10 km: an ambulance ~11 km out only appears once the
/// caller widens the search.
#[tokio::test]
async fn nearby_defaults_radius_to_ten_km() {
    let app = TestApp::new();
    seed_ambulance(app.directory(), UserId::new(), "AMB-11KM", 0.099, 0.0).await;

    let response = app
        .send(post_json("/nearby", None, &json!({"lat": 0.0, "lon": 0.0})))
        .await;
    let body = json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let response = app
        .send(post_json(
            "/nearby",
            None,
            &json!({"lat": 0.0, "lon": 0.0, "radius_km": 15.0}),
        ))
        .await;
    let body = json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn nearby_rejects_out_of_range_coordinates() {
    let app = TestApp::new();

    let response = app
        .send(post_json("/nearby", None, &json!({"lat": 91.0, "lon": 0.0})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "latitude must be between -90 and 90");

    let response = app
        .send(post_json(
            "/nearby",
            None,
            &json!({"lat": 0.0, "lon": -180.5}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "longitude must be between -180 and 180");
}

#[tokio::test]
async fn nearby_rejects_bad_radius_and_limit() {
    let app = TestApp::new();

    for payload in [
        json!({"lat": 0.0, "lon": 0.0, "radius_km": 0.0}),
        json!({"lat": 0.0, "lon": 0.0, "radius_km": 100.1}),
        json!({"lat": 0.0, "lon": 0.0, "limit": 0}),
        json!({"lat": 0.0, "lon": 0.0, "limit": 51}),
        json!({"lat": 0.0, "lon": 0.0, "limit": -3}),
    ] {
        let response = app.send(post_json("/nearby", None, &payload)).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "payload {payload} should be rejected"
        );
    }
}

/// GET on the search path is not routed; the search is a POST.
#[tokio::test]
async fn nearby_is_post_only() {
    let app = TestApp::new();
    let response = app.send(get("/nearby", None)).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
