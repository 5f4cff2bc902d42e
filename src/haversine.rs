//! Great-circle distances.
//!
//! Distances are accumulated at full precision and only rounded to two
//! decimals by [`route_length`], so per-segment rounding never compounds.

use crate::point::GeoPoint;
use crate::route::Route;
use crate::traits::DistanceProvider;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based distance provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl DistanceProvider for Haversine {
    fn distance_km(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        haversine_km((from.lat(), from.lng()), (to.lat(), to.lng()))
    }
}

/// Haversine distance between two raw (lat, lng) pairs in kilometers.
///
/// Uses the `atan2` form, which stays stable near antipodal points.
/// NaN or infinite inputs yield NaN.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding noise can push h a hair past 1.0 for antipodes.
    let h = if h > 1.0 { 1.0 } else { h };
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Unrounded great-circle distance between two points.
pub fn distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    Haversine.distance_km(from, to)
}

/// Unrounded sum of consecutive segment distances.
pub fn path_length_km<D: DistanceProvider>(provider: &D, points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| provider.distance_km(&pair[0], &pair[1]))
        .sum()
}

/// Total length of a route in kilometers, rounded to two decimals.
///
/// Routes with fewer than two points have length zero.
pub fn route_length(route: &Route) -> f64 {
    round_km(path_length_km(&Haversine, route.points()))
}

/// Round a distance to two decimal places.
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
