//! Error taxonomy for ingest, aggregation and output.

use thiserror::Error;

/// Errors raised while baking courier aggregates.
#[derive(Debug, Error)]
pub enum BakeError {
    /// A ping's timestamp or coordinates could not be resolved.
    ///
    /// Aborts the whole run: a dropped ping would corrupt both distances of
    /// its bucket without any visible trace in the output.
    #[error("malformed ping for courier {entity_id} at `{timestamp}`: {reason}")]
    MalformedPing {
        entity_id: i64,
        timestamp: String,
        reason: String,
    },

    #[error("coordinate ({lat}, {lng}) is outside the valid lat/lng range")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// A (month, day) pair that does not exist in the given year.
    #[error("{year}-{month:02}-{day:02} is not a calendar date")]
    CalendarInconsistency { year: i32, month: u32, day: u32 },

    #[error("calendar year {0} is out of range")]
    InvalidYear(i32),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, BakeError>;
