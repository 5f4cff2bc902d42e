//! Tabular output for the aggregate and region tables.
//!
//! Id sets are written as bracketed lists (`[]`, `[3]`, `[3, 7]`) and
//! distances with two decimals.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::AggregateRow;
use crate::error::Result;
use crate::region_metrics::RegionDayRow;

#[derive(Debug, Serialize)]
struct AggregateRecord {
    courier_id: i64,
    month: u32,
    day: u32,
    regions: String,
    distance: String,
    optimized_distance: String,
}

#[derive(Debug, Deserialize)]
struct StoredAggregate {
    courier_id: i64,
    month: u32,
    day: u32,
    regions: String,
    distance: f64,
    optimized_distance: f64,
}

#[derive(Debug, Serialize)]
struct RegionRecord {
    region_id: i64,
    month: u32,
    day: u32,
    couriers: String,
}

/// Format an id set as `[a, b, c]`.
pub fn format_id_list(ids: &BTreeSet<i64>) -> String {
    let items: Vec<String> = ids.iter().map(i64::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Parse a bracketed id list; non-integer items are skipped.
pub fn parse_id_list(raw: &str) -> BTreeSet<i64> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .filter_map(|item| item.trim().parse().ok())
        .collect()
}

/// Write aggregate rows sorted by (courier, month, day).
pub fn write_aggregates<W: Write>(writer: W, rows: &[AggregateRow]) -> Result<()> {
    let mut sorted: Vec<&AggregateRow> = rows.iter().collect();
    sorted.sort_by_key(|row| (row.entity_id, row.month, row.day));

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in sorted {
        writer.serialize(AggregateRecord {
            courier_id: row.entity_id,
            month: row.month,
            day: row.day,
            regions: format_id_list(&row.regions),
            distance: format!("{:.2}", row.distance),
            optimized_distance: format!("{:.2}", row.optimized_distance),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write region rows sorted by (region, month, day).
pub fn write_region_metrics<W: Write>(writer: W, rows: &[RegionDayRow]) -> Result<()> {
    let mut sorted: Vec<&RegionDayRow> = rows.iter().collect();
    sorted.sort_by_key(|row| (row.region_id, row.month, row.day));

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in sorted {
        writer.serialize(RegionRecord {
            region_id: row.region_id,
            month: row.month,
            day: row.day,
            couriers: format_id_list(&row.couriers),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Replace the file at `path` with the aggregate table.
pub fn save_aggregates(path: &Path, rows: &[AggregateRow]) -> Result<()> {
    debug!(path = %path.display(), "Writing aggregate table");
    write_aggregates(File::create(path)?, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Aggregate table written");
    Ok(())
}

pub fn save_region_metrics(path: &Path, rows: &[RegionDayRow]) -> Result<()> {
    write_region_metrics(File::create(path)?, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Region table written");
    Ok(())
}

/// Read back an aggregate table written by [`write_aggregates`].
pub fn read_aggregates<R: Read>(reader: R) -> Result<Vec<AggregateRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for record in reader.deserialize::<StoredAggregate>() {
        let record = record?;
        rows.push(AggregateRow {
            entity_id: record.courier_id,
            month: record.month,
            day: record.day,
            regions: parse_id_list(&record.regions),
            distance: record.distance,
            optimized_distance: record.optimized_distance,
        });
    }

    Ok(rows)
}
