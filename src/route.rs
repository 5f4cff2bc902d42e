//! Ordered point sequences.
//!
//! A route is either the temporal order a courier's pings were recorded in,
//! or a reordering of those pings produced by the solver.

use crate::point::GeoPoint;

/// An ordered sequence of points. Duplicate coordinates are distinct stops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Returns a reference to the ordered points.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Consumes the route and returns the owned points.
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The same stops visited in the opposite order.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }
}

impl From<Vec<GeoPoint>> for Route {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<GeoPoint> for Route {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
