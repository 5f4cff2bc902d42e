//! Per-courier, per-day distance aggregation.
//!
//! Groups pings by courier and calendar day, measures the driven route and a
//! nearest-neighbor tour over the same stops, and densifies the result so
//! every courier has exactly one row for every day of the year.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::calendar::{CalendarDay, days_of_year};
use crate::error::Result;
use crate::haversine::route_length;
use crate::ping::Ping;
use crate::point::GeoPoint;
use crate::route::Route;
use crate::solver::nearest_neighbor_tour;

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Year whose days make up the dense output index.
    pub calendar_year: i32,
    /// Process couriers on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            calendar_year: Utc::now().year(),
            parallel: true,
        }
    }
}

impl AggregateOptions {
    pub fn for_year(calendar_year: i32) -> Self {
        Self {
            calendar_year,
            ..Self::default()
        }
    }
}

/// One (courier, month, day) partition of the output table.
///
/// `optimized_distance` may exceed `distance`: the tour is closed and greedy.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub entity_id: i64,
    pub month: u32,
    pub day: u32,
    pub regions: BTreeSet<i64>,
    /// Kilometers along the pings in recorded order, rounded to 2 decimals.
    pub distance: f64,
    /// Kilometers along the nearest-neighbor tour, rounded to 2 decimals.
    pub optimized_distance: f64,
}

impl AggregateRow {
    /// Row for a day without pings.
    ///
    /// A day with a single region-less ping produces an identical row, so the
    /// two cannot be told apart from the row alone.
    pub fn placeholder(entity_id: i64, day: CalendarDay) -> Self {
        Self {
            entity_id,
            month: day.month(),
            day: day.day(),
            regions: BTreeSet::new(),
            distance: 0.0,
            optimized_distance: 0.0,
        }
    }
}

/// Aggregate `pings` over every day of `calendar_year`.
///
/// Fails on the first ping that cannot be placed in the year; no partial
/// table is returned. Row order is unspecified.
pub fn aggregate(pings: &[Ping], calendar_year: i32) -> Result<Vec<AggregateRow>> {
    aggregate_with(pings, &AggregateOptions::for_year(calendar_year))
}

pub fn aggregate_with(pings: &[Ping], options: &AggregateOptions) -> Result<Vec<AggregateRow>> {
    let calendar = days_of_year(options.calendar_year)?;
    let partitions = partition_by_entity(pings);

    info!(
        pings = pings.len(),
        couriers = partitions.len(),
        year = options.calendar_year,
        parallel = options.parallel,
        "Aggregating courier distances"
    );

    let per_entity: Vec<Vec<AggregateRow>> = if options.parallel {
        partitions
            .par_iter()
            .map(|(entity_id, pings)| aggregate_entity(*entity_id, pings, options.calendar_year, &calendar))
            .collect::<Result<_>>()?
    } else {
        partitions
            .iter()
            .map(|(entity_id, pings)| aggregate_entity(*entity_id, pings, options.calendar_year, &calendar))
            .collect::<Result<_>>()?
    };

    let rows: Vec<AggregateRow> = per_entity.into_iter().flatten().collect();
    info!(rows = rows.len(), "Aggregation complete");
    Ok(rows)
}

/// Group pings by courier, keeping input order within each group.
pub(crate) fn partition_by_entity(pings: &[Ping]) -> BTreeMap<i64, Vec<&Ping>> {
    let mut partitions: BTreeMap<i64, Vec<&Ping>> = BTreeMap::new();
    for ping in pings {
        partitions.entry(ping.entity_id).or_default().push(ping);
    }
    partitions
}

/// Group one courier's pings by day, each bucket in ascending timestamp order.
///
/// The sort is stable, so pings sharing a timestamp keep their input order.
pub(crate) fn bucket_by_day<'a>(pings: &[&'a Ping], year: i32) -> Result<BTreeMap<CalendarDay, Vec<&'a Ping>>> {
    let mut buckets: BTreeMap<CalendarDay, Vec<&Ping>> = BTreeMap::new();
    for &ping in pings {
        buckets.entry(ping.calendar_day(year)?).or_default().push(ping);
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by_key(|ping| ping.timestamp);
    }
    Ok(buckets)
}

fn aggregate_entity(entity_id: i64, pings: &[&Ping], year: i32, calendar: &[CalendarDay]) -> Result<Vec<AggregateRow>> {
    let mut buckets = bucket_by_day(pings, year)?;
    let active_days = buckets.len();

    let rows: Vec<AggregateRow> = calendar
        .iter()
        .map(|&day| match buckets.remove(&day) {
            Some(bucket) => summarize_bucket(entity_id, day, &bucket),
            None => AggregateRow::placeholder(entity_id, day),
        })
        .collect();

    debug!(
        entity_id,
        active_days,
        placeholders = calendar.len() - active_days,
        "Courier aggregated"
    );
    Ok(rows)
}

/// `bucket` is non-empty: days without pings never get a bucket.
fn summarize_bucket(entity_id: i64, day: CalendarDay, bucket: &[&Ping]) -> AggregateRow {
    let points: Vec<GeoPoint> = bucket.iter().map(|ping| ping.location).collect();
    let regions = bucket.iter().filter_map(|ping| ping.region_id).collect();
    let optimized_distance = route_length(&nearest_neighbor_tour(&points));
    let distance = route_length(&Route::new(points));

    AggregateRow {
        entity_id,
        month: day.month(),
        day: day.day(),
        regions,
        distance,
        optimized_distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ping(entity_id: i64, raw: &str, lat: f64, lng: f64, region_id: Option<i64>) -> Ping {
        let timestamp = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap();
        Ping::new(entity_id, timestamp, GeoPoint::new(lat, lng).unwrap(), region_id)
    }

    fn row_for(rows: &[AggregateRow], entity_id: i64, month: u32, day: u32) -> &AggregateRow {
        rows.iter()
            .find(|row| row.entity_id == entity_id && row.month == month && row.day == day)
            .unwrap()
    }

    #[test]
    fn test_bucket_sorted_by_timestamp() {
        let pings = [
            ping(1, "2022-05-01 12:00:00", 0.0, 2.0, None),
            ping(1, "2022-05-01 08:00:00", 0.0, 0.0, None),
            ping(1, "2022-05-01 10:00:00", 0.0, 1.0, None),
        ];
        let refs: Vec<&Ping> = pings.iter().collect();
        let buckets = bucket_by_day(&refs, 2022).unwrap();
        let bucket = &buckets[&CalendarDay::new(2022, 5, 1).unwrap()];
        let lngs: Vec<f64> = bucket.iter().map(|p| p.location.lng()).collect();
        assert_eq!(lngs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let pings = [
            ping(1, "2022-05-01 08:00:00", 0.0, 5.0, None),
            ping(1, "2022-05-01 08:00:00", 0.0, 3.0, None),
        ];
        let refs: Vec<&Ping> = pings.iter().collect();
        let buckets = bucket_by_day(&refs, 2022).unwrap();
        let bucket = &buckets[&CalendarDay::new(2022, 5, 1).unwrap()];
        assert_eq!(bucket[0].location.lng(), 5.0);
    }

    #[test]
    fn test_regions_skip_unset() {
        let pings = vec![
            ping(1, "2022-05-01 08:00:00", 31.20, 121.40, Some(4)),
            ping(1, "2022-05-01 09:00:00", 31.21, 121.41, None),
            ping(1, "2022-05-01 10:00:00", 31.22, 121.42, Some(2)),
            ping(1, "2022-05-01 11:00:00", 31.23, 121.43, Some(4)),
            ping(1, "2022-05-02 08:00:00", 31.20, 121.40, None),
        ];
        let rows = aggregate(&pings, 2022).unwrap();

        let first = row_for(&rows, 1, 5, 1);
        assert_eq!(first.regions.iter().copied().collect::<Vec<_>>(), vec![2, 4]);

        let second = row_for(&rows, 1, 5, 2);
        assert!(second.regions.is_empty());
        assert_eq!(second.distance, 0.0);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let pings = vec![
            ping(1, "2022-01-03 08:00:00", 31.20, 121.40, Some(1)),
            ping(1, "2022-01-03 09:00:00", 31.30, 121.50, Some(1)),
            ping(2, "2022-07-04 08:00:00", 31.10, 121.30, Some(9)),
            ping(2, "2022-07-04 08:30:00", 31.00, 121.20, Some(9)),
        ];
        let mut parallel = aggregate(&pings, 2022).unwrap();
        let mut sequential = aggregate_with(
            &pings,
            &AggregateOptions {
                calendar_year: 2022,
                parallel: false,
            },
        )
        .unwrap();

        let key = |row: &AggregateRow| (row.entity_id, row.month, row.day);
        parallel.sort_by_key(key);
        sequential.sort_by_key(key);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_placeholder() {
        let row = AggregateRow::placeholder(3, CalendarDay::new(2022, 2, 28).unwrap());
        assert_eq!((row.entity_id, row.month, row.day), (3, 2, 28));
        assert!(row.regions.is_empty());
        assert_eq!((row.distance, row.optimized_distance), (0.0, 0.0));
    }

    #[test]
    fn test_single_unset_region_ping_is_one_active_day() {
        let pings = [ping(7, "2022-05-01 08:00:00", 31.2, 121.4, None)];
        let refs: Vec<&Ping> = pings.iter().collect();
        let calendar = days_of_year(2022).unwrap();
        let rows = aggregate_entity(7, &refs, 2022, &calendar).unwrap();

        assert_eq!(rows.len(), 365);
        let active = row_for(&rows, 7, 5, 1);
        assert_eq!(active, &AggregateRow::placeholder(7, CalendarDay::new(2022, 5, 1).unwrap()));
        assert_eq!(rows.iter().filter(|row| (row.month, row.day) == (5, 1)).count(), 1);
        assert_eq!(bucket_by_day(&refs, 2022).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        assert!(aggregate(&[], 2022).unwrap().is_empty());
    }
}
