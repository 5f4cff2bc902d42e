//! courier-routes core
//!
//! Bakes raw courier delivery pings into a dense per-courier, per-day table of
//! driven distance and nearest-neighbor tour distance.

pub mod error;
pub mod point;
pub mod route;
pub mod traits;
pub mod haversine;
pub mod solver;
pub mod calendar;
pub mod ping;
pub mod aggregate;
pub mod region_metrics;
pub mod source;
pub mod ingest;
pub mod output;

pub use aggregate::{AggregateOptions, AggregateRow, aggregate, aggregate_with};
pub use error::{BakeError, Result};
pub use point::GeoPoint;
pub use route::Route;
