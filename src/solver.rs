//! Greedy nearest-neighbor tour construction.
//!
//! Used as a cheap stand-in for the optimal round trip over one courier's
//! deliveries on one day. There is no optimality guarantee; the result can be
//! longer than the order the courier actually drove.

use std::cmp::Ordering;

use crate::haversine::Haversine;
use crate::point::GeoPoint;
use crate::route::Route;
use crate::traits::DistanceProvider;

/// Build a closed nearest-neighbor tour using great-circle distances.
///
/// The tour starts at `points[0]`, visits every other point exactly once and
/// returns to `points[0]`. An empty input yields an empty route.
pub fn nearest_neighbor_tour(points: &[GeoPoint]) -> Route {
    nearest_neighbor_tour_with(&Haversine, points)
}

/// Same as [`nearest_neighbor_tour`] with a custom distance provider.
pub fn nearest_neighbor_tour_with<D: DistanceProvider>(provider: &D, points: &[GeoPoint]) -> Route {
    nearest_neighbor_order(provider, points)
        .into_iter()
        .map(|index| points[index])
        .collect()
}

/// Tour as a sequence of indices into `points`, closing back on index 0.
///
/// Visited state is tracked by index, so stops sharing coordinates are never
/// merged. Ties on distance go to the lowest original index.
pub fn nearest_neighbor_order<D: DistanceProvider>(provider: &D, points: &[GeoPoint]) -> Vec<usize> {
    if points.is_empty() {
        return Vec::new();
    }

    let mut tour = Vec::with_capacity(points.len() + 1);
    tour.push(0);

    // Kept in ascending index order so the first minimum found is the tie winner.
    let mut remaining: Vec<usize> = (1..points.len()).collect();
    let mut current = 0;

    while !remaining.is_empty() {
        let mut best_slot = 0;
        let mut best_distance = provider.distance_km(&points[current], &points[remaining[0]]);

        for (slot, &candidate) in remaining.iter().enumerate().skip(1) {
            let distance = provider.distance_km(&points[current], &points[candidate]);
            if distance.total_cmp(&best_distance) == Ordering::Less {
                best_slot = slot;
                best_distance = distance;
            }
        }

        current = remaining.remove(best_slot);
        tour.push(current);
    }

    tour.push(0);
    tour
}
