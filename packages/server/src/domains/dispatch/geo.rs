//! Proximity matching for ambulance dispatch.
//!
//! Distances use the haversine formula on a spherical Earth; ETAs assume a
//! flat average road speed. Both are deliberately simple: the product needs a
//! stable ranking and a rough arrival estimate, not routing-grade numbers.

use serde::Serialize;

use super::error::DispatchError;
use crate::domains::ambulances::models::ambulance::Ambulance;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed average road speed for ETA estimates.
const AVERAGE_SPEED_KMH: f64 = 40.0;

pub const DEFAULT_RADIUS_KM: f64 = 10.0;
pub const MAX_RADIUS_KM: f64 = 100.0;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;

/// A validated WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Validate and build a point.
    ///
    /// NaN fails both range checks, so it can never sneak into a stored
    /// coordinate or a distance computation.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DispatchError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DispatchError::Validation(
                "latitude must be between -90 and 90".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DispatchError::Validation(
                "longitude must be between -180 and 180".to_string(),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to another point in kilometers (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (dlon / 2.0).sin().powi(2);

        EARTH_RADIUS_KM * 2.0 * a.sqrt().asin()
    }
}

/// Google Maps directions link for a destination, embedded in dispatch
/// notifications so crews and patients can navigate with one tap.
pub fn directions_link(destination: Coordinates) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        destination.latitude, destination.longitude
    )
}

/// A validated proximity search.
#[derive(Debug, Clone, Copy)]
pub struct NearbyQuery {
    origin: Coordinates,
    radius_km: f64,
    limit: i64,
}

impl NearbyQuery {
    pub fn new(origin: Coordinates, radius_km: f64, limit: i64) -> Result<Self, DispatchError> {
        // The negated comparison keeps NaN out as well
        if !(radius_km > 0.0 && radius_km <= MAX_RADIUS_KM) {
            return Err(DispatchError::Validation(format!(
                "radius_km must be greater than 0 and at most {MAX_RADIUS_KM}"
            )));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(DispatchError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(Self {
            origin,
            radius_km,
            limit,
        })
    }
}

/// An ambulance that matched a proximity search.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyAmbulance {
    pub ambulance: Ambulance,
    /// Distance from the search origin, rounded to two decimals.
    pub distance_km: f64,
    /// Estimated minutes to reach the origin at average road speed.
    #[serde(rename = "eta_min")]
    pub eta_minutes: i64,
}

/// Rank candidate ambulances by distance from the search origin.
///
/// Candidates without a reported location never match. Membership is decided
/// on the exact distance (inclusive of the radius boundary); the reported
/// distance is rounded afterwards, so an ambulance just outside the radius is
/// excluded even when its rounded distance reads as equal to it. Ordering is
/// by rounded distance with ambulance ID as the tiebreaker, which keeps the
/// ranking stable across calls; truncation to the limit happens last.
pub fn find_nearby(query: &NearbyQuery, candidates: Vec<Ambulance>) -> Vec<NearbyAmbulance> {
    let mut matches: Vec<NearbyAmbulance> = candidates
        .into_iter()
        .filter_map(|ambulance| {
            let location = ambulance.location()?;
            let distance = query.origin.distance_km(&location);
            if distance > query.radius_km {
                return None;
            }
            Some(NearbyAmbulance {
                distance_km: round_two_decimals(distance),
                eta_minutes: eta_minutes(distance),
                ambulance,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.ambulance.id.cmp(&b.ambulance.id))
    });
    matches.truncate(query.limit as usize);
    matches
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn eta_minutes(distance_km: f64) -> i64 {
    (distance_km / AVERAGE_SPEED_KMH * 60.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;

    fn ambulance_at(number: &str, latitude: f64, longitude: f64) -> Ambulance {
        let location = Coordinates {
            latitude,
            longitude,
        };
        Ambulance::new(UserId::new(), number, "Test Driver", "+94770000000", Some(location))
    }

    fn query(origin: Coordinates, radius_km: f64, limit: i64) -> NearbyQuery {
        NearbyQuery::new(origin, radius_km, limit).unwrap()
    }

    const ORIGIN: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };

    #[test]
    fn test_distance_same_point_is_zero() {
        let colombo = Coordinates {
            latitude: 6.9271,
            longitude: 79.8612,
        };
        assert_eq!(colombo.distance_km(&colombo), 0.0);
    }

    #[test]
    fn test_distance_one_degree_of_latitude() {
        // One degree of latitude is ~111.19 km on a 6371 km sphere
        let north = Coordinates {
            latitude: 1.0,
            longitude: 0.0,
        };
        let distance = ORIGIN.distance_km(&north);
        assert!((distance - 111.19).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn test_coordinates_rejects_out_of_range() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
        assert!(Coordinates::new(90.1, 0.0).is_err());
        assert!(Coordinates::new(-90.1, 0.0).is_err());
        assert!(Coordinates::new(0.0, 180.1).is_err());
        assert!(Coordinates::new(0.0, -180.1).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_query_rejects_bad_radius_and_limit() {
        assert!(NearbyQuery::new(ORIGIN, 100.0, 50).is_ok());
        assert!(NearbyQuery::new(ORIGIN, 0.0, 10).is_err());
        assert!(NearbyQuery::new(ORIGIN, -5.0, 10).is_err());
        assert!(NearbyQuery::new(ORIGIN, 100.1, 10).is_err());
        assert!(NearbyQuery::new(ORIGIN, f64::NAN, 10).is_err());
        assert!(NearbyQuery::new(ORIGIN, 10.0, 0).is_err());
        assert!(NearbyQuery::new(ORIGIN, 10.0, -1).is_err());
        assert!(NearbyQuery::new(ORIGIN, 10.0, 51).is_err());
    }

    #[test]
    fn test_nearby_filters_by_radius() {
        let near = ambulance_at("AMB-NEAR", 0.05, 0.0); // ~5.6 km
        let far = ambulance_at("AMB-FAR", 0.2, 0.0); // ~22.2 km
        let matches = find_nearby(&query(ORIGIN, 10.0, 10), vec![far, near]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].ambulance.ambulance_number, "AMB-NEAR");
    }

    #[test]
    fn test_membership_uses_exact_distance_not_rounded() {
        // ~10.003 km out: rounds to 10.00 but is beyond a 10 km radius
        let just_outside = ambulance_at("AMB-EDGE", 0.0899591, 0.0);
        let matches = find_nearby(&query(ORIGIN, 10.0, 10), vec![just_outside]);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_nearby_skips_ambulances_without_location() {
        let unplaced = Ambulance::new(UserId::new(), "AMB-NOLOC", "Test Driver", "+9477", None);
        let matches = find_nearby(&query(ORIGIN, 10.0, 10), vec![unplaced]);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_nearby_sorts_by_distance_and_truncates() {
        let third = ambulance_at("AMB-3", 0.06, 0.0);
        let first = ambulance_at("AMB-1", 0.01, 0.0);
        let second = ambulance_at("AMB-2", 0.03, 0.0);

        let matches = find_nearby(&query(ORIGIN, 10.0, 2), vec![third, first, second]);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].ambulance.ambulance_number, "AMB-1");
        assert_eq!(matches[1].ambulance.ambulance_number, "AMB-2");
        assert!(matches[0].distance_km < matches[1].distance_km);
    }

    #[test]
    fn test_nearby_ties_break_by_ambulance_id() {
        let a = ambulance_at("AMB-A", 0.02, 0.0);
        let b = ambulance_at("AMB-B", 0.02, 0.0);
        let (lo, hi) = if a.id < b.id {
            ("AMB-A", "AMB-B")
        } else {
            ("AMB-B", "AMB-A")
        };

        let matches = find_nearby(&query(ORIGIN, 10.0, 10), vec![a, b]);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].ambulance.ambulance_number, lo);
        assert_eq!(matches[1].ambulance.ambulance_number, hi);
    }

    #[test]
    fn test_reported_distance_is_rounded() {
        let nearby = ambulance_at("AMB-R", 0.05, 0.0); // 5.5597... km
        let matches = find_nearby(&query(ORIGIN, 10.0, 10), vec![nearby]);
        assert_eq!(matches[0].distance_km, 5.56);
    }

    #[test]
    fn test_eta_assumes_forty_kmh() {
        assert_eq!(eta_minutes(0.0), 0);
        assert_eq!(eta_minutes(10.0), 15);
        assert_eq!(eta_minutes(40.0), 60);
        // Half-minutes round away from zero
        assert_eq!(eta_minutes(1.0), 2);
    }

    #[test]
    fn test_directions_link_format() {
        let destination = Coordinates {
            latitude: 6.9271,
            longitude: 79.8612,
        };
        assert_eq!(
            directions_link(destination),
            "https://www.google.com/maps/dir/?api=1&destination=6.9271,79.8612"
        );
    }
}
