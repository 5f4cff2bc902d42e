//! Tabular ping input.
//!
//! The table is CSV with a header row. Required columns are `courier_id`,
//! `delivery_gps_time`, `delivery_gps_lat` and `delivery_gps_lng`; `region_id`,
//! `accept_time` and `delivery_time` are optional. Other columns are ignored.

use std::io::Read;

use chrono::{Datelike, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{BakeError, Result};
use crate::ping::{Ping, parse_timestamp};
use crate::point::GeoPoint;
use crate::traits::PingSource;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Year used to place timestamps written without one.
    pub calendar_year: i32,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            calendar_year: Utc::now().year(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PingRecord {
    courier_id: i64,
    delivery_gps_time: String,
    delivery_gps_lat: String,
    delivery_gps_lng: String,
    #[serde(default)]
    region_id: Option<String>,
    #[serde(default)]
    accept_time: Option<String>,
    #[serde(default)]
    delivery_time: Option<String>,
}

impl PingRecord {
    fn into_ping(self, options: &IngestOptions) -> Result<Ping> {
        let malformed = |reason: String| BakeError::MalformedPing {
            entity_id: self.courier_id,
            timestamp: self.delivery_gps_time.clone(),
            reason,
        };

        let timestamp = parse_timestamp(&self.delivery_gps_time, options.calendar_year).ok_or_else(|| {
            malformed(format!(
                "unparseable timestamp for calendar year {}",
                options.calendar_year
            ))
        })?;

        let lat = parse_degrees(&self.delivery_gps_lat).ok_or_else(|| {
            malformed(format!("unparseable latitude `{}`", self.delivery_gps_lat))
        })?;
        let lng = parse_degrees(&self.delivery_gps_lng).ok_or_else(|| {
            malformed(format!("unparseable longitude `{}`", self.delivery_gps_lng))
        })?;
        let location = GeoPoint::new(lat, lng).map_err(|err| malformed(err.to_string()))?;

        let region_id = self.region();

        let mut ping = Ping::new(self.courier_id, timestamp, location, region_id);
        ping.accepted_at = self.optional_time(self.accept_time.as_deref(), "accept_time", options);
        ping.delivered_at = self.optional_time(self.delivery_time.as_deref(), "delivery_time", options);
        Ok(ping)
    }

    fn region(&self) -> Option<i64> {
        let raw = self.region_id.as_deref().map(str::trim).filter(|raw| !raw.is_empty())?;
        let parsed = parse_region(raw);
        if parsed.is_none() {
            warn!(courier_id = self.courier_id, raw, "Ignoring unparseable region id");
        }
        parsed
    }

    fn optional_time(&self, raw: Option<&str>, column: &str, options: &IngestOptions) -> Option<NaiveDateTime> {
        let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;
        let parsed = parse_timestamp(raw, options.calendar_year);
        if parsed.is_none() {
            warn!(courier_id = self.courier_id, column, raw, "Ignoring unparseable delivery time");
        }
        parsed
    }
}

fn parse_degrees(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

/// Region ids are integers, possibly written as integral floats (`7.0`)
/// by exporters that widen the column. Anything else counts as unset.
fn parse_region(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        let value: f64 = raw.parse().ok()?;
        let integral = value.is_finite() && value.fract() == 0.0;
        (integral && (i64::MIN as f64..i64::MAX as f64).contains(&value)).then_some(value as i64)
    })
}

/// Parse a ping table, failing on the first record that cannot be resolved.
pub fn read_pings<R: Read>(reader: R, options: &IngestOptions) -> Result<Vec<Ping>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut pings = Vec::new();

    for record in reader.deserialize::<PingRecord>() {
        pings.push(record?.into_ping(options)?);
    }

    Ok(pings)
}

/// Fetch a table from `source` and parse it.
pub fn load_pings<S: PingSource>(source: &S, options: &IngestOptions) -> Result<Vec<Ping>> {
    let bytes = source.fetch()?;
    let pings = read_pings(bytes.as_slice(), options)?;
    info!(source = %source.describe(), pings = pings.len(), "Loaded pings");
    Ok(pings)
}
