//! Shanghai delivery stops for realistic test fixtures.
//!
//! Approximate coordinates of well-known landmarks and residential blocks.

#![allow(dead_code)]

use chrono::NaiveDateTime;
use courier_routes::GeoPoint;
use courier_routes::ping::Ping;

/// A named stop with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng).unwrap()
    }
}

// ============================================================================
// Huangpu / Jing'an
// ============================================================================

pub const PUXI_STOPS: &[Location] = &[
    Location::new("People's Square", 31.2304, 121.4737),
    Location::new("Nanjing Road East", 31.2386, 121.4840),
    Location::new("Jing'an Temple", 31.2235, 121.4455),
    Location::new("Xintiandi", 31.2196, 121.4752),
    Location::new("Yu Garden", 31.2272, 121.4921),
    Location::new("Shanghai Museum", 31.2284, 121.4754),
    Location::new("Tianzifang", 31.2082, 121.4684),
    Location::new("Shanghai Railway Station", 31.2495, 121.4557),
];

// ============================================================================
// Pudong
// ============================================================================

pub const PUDONG_STOPS: &[Location] = &[
    Location::new("Lujiazui", 31.2397, 121.4998),
    Location::new("Century Park", 31.2150, 121.5510),
    Location::new("Zhangjiang Hi-Tech Park", 31.2033, 121.5903),
    Location::new("Jinqiao", 31.2646, 121.5940),
    Location::new("Pudong Airport", 31.1443, 121.8083),
];

/// Build a ping from a `YYYY-MM-DD HH:MM:SS` timestamp.
pub fn ping_at(courier_id: i64, raw: &str, stop: &Location, region_id: Option<i64>) -> Ping {
    let timestamp = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap();
    Ping::new(courier_id, timestamp, stop.point(), region_id)
}
