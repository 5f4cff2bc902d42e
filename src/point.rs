//! Geographic point value type.

use serde::{Deserialize, Serialize};

use crate::error::{BakeError, Result};

/// A latitude/longitude pair in degrees.
///
/// [`GeoPoint::new`] rejects non-finite and out-of-range values, and
/// deserialization goes through it too, so a point is always well-formed.
/// The distance functions themselves do not re-validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = BakeError;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        Self::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(BakeError::InvalidCoordinate { lat, lng })
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}
