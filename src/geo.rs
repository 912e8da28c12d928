//! Geographic distance helpers.
//!
//! Two metrics live here. The haversine distance is the real one and backs
//! the city radius filter. The degree-space distance is a flat Euclidean
//! approximation kept for the `/api/events` proximity lookup, whose callers
//! rely on its exact cutoff.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers for haversine calculations.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius around a selected city that events must fall within (inclusive).
pub const CITY_RADIUS_KM: f64 = 100.0;

/// Degree-space cutoff for the proximity lookup (exclusive), roughly 10 km.
pub const NEARBY_THRESHOLD_DEGREES: f64 = 0.1;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in kilometers.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Calculate the great-circle distance between two points using the haversine formula.
///
/// Returns distance in kilometers.
#[must_use]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.0;
    let lat2_rad = lat2 * PI / 180.0;
    let delta_lat = (lat2 - lat1) * PI / 180.0;
    let delta_lon = (lon2 - lon1) * PI / 180.0;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Euclidean distance between two points treating degrees as a flat plane.
///
/// Not a real distance. Only meaningful for the small-threshold proximity
/// check in [`within_nearby_threshold`].
#[must_use]
pub fn degree_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    (a.latitude - b.latitude).hypot(a.longitude - b.longitude)
}

/// Whether `point` is strictly closer than [`NEARBY_THRESHOLD_DEGREES`] to `center`.
#[must_use]
pub fn within_nearby_threshold(center: &Coordinates, point: &Coordinates) -> bool {
    degree_distance(center, point) < NEARBY_THRESHOLD_DEGREES
}

/// Whether `point` is within [`CITY_RADIUS_KM`] of `center`.
#[must_use]
pub fn within_city_radius(center: &Coordinates, point: &Coordinates) -> bool {
    center.distance_km(point) <= CITY_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    const SF: Coordinates = Coordinates::new(37.7749, -122.4194);
    const LA: Coordinates = Coordinates::new(34.0522, -118.2437);
    const SJ: Coordinates = Coordinates::new(37.3382, -121.8863);

    #[test]
    fn test_haversine() {
        // SF to LA is roughly 560 km
        let distance = SF.distance_km(&LA);
        assert!(distance > 500.0 && distance < 620.0);
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        for point in [SF, LA, SJ, Coordinates::new(-33.86, 151.21)] {
            assert!(point.distance_km(&point).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_haversine_symmetric() {
        let pairs = [(SF, LA), (LA, SJ), (SJ, Coordinates::new(40.7128, -74.006))];
        for (a, b) in pairs {
            assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_haversine_antipodal() {
        let distance = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!((distance - PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_city_radius() {
        // SF to San Jose is ~70 km
        assert!(within_city_radius(&SF, &SJ));
        assert!(!within_city_radius(&SF, &LA));
    }

    #[test]
    fn test_degree_distance_threshold() {
        assert!(within_nearby_threshold(&SF, &SF));
        assert!(within_nearby_threshold(&SF, &Coordinates::new(37.80, -122.45)));
        // Exactly on the cutoff is excluded
        assert!(!within_nearby_threshold(
            &Coordinates::new(0.0, 0.0),
            &Coordinates::new(0.1, 0.0)
        ));
        assert!(!within_nearby_threshold(&SF, &SJ));
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(SF.is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }
}
