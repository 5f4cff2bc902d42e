//! Seams between the aggregation core and its collaborators.
//!
//! The core only needs a way to measure two points and, at the edge, a way
//! to obtain the raw ping table. Both are kept minimal.

use crate::error::Result;
use crate::point::GeoPoint;

/// Measures the distance between two points in kilometers.
///
/// Implementations must be symmetric and return zero for identical points.
pub trait DistanceProvider {
    fn distance_km(&self, from: &GeoPoint, to: &GeoPoint) -> f64;
}

/// Produces the raw bytes of a ping table.
pub trait PingSource {
    fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable origin, used in log lines.
    fn describe(&self) -> String;
}
