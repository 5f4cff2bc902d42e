//! Region-centric views over the same ping table.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::calendar::{CalendarDay, days_of_year};
use crate::error::Result;
use crate::ping::Ping;

/// Average delivery time above which a region counts as overloaded.
pub const DEFAULT_OVERLOAD_HOURS: f64 = 5.0;

/// Couriers active in one region on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDayRow {
    pub region_id: i64,
    pub month: u32,
    pub day: u32,
    pub couriers: BTreeSet<i64>,
}

/// Mean accept-to-delivery time for a region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDuration {
    pub region_id: i64,
    pub mean_hours: f64,
    pub deliveries: usize,
}

impl RegionDuration {
    pub fn is_overloaded(&self, threshold_hours: f64) -> bool {
        self.mean_hours >= threshold_hours
    }
}

/// Dense (region, month, day) table of active couriers.
///
/// Pings without a region are not attributed anywhere, but their timestamps
/// are still validated so a bad record fails the run.
pub fn region_metrics(pings: &[Ping], calendar_year: i32) -> Result<Vec<RegionDayRow>> {
    let calendar = days_of_year(calendar_year)?;

    let mut activity: BTreeMap<i64, BTreeMap<CalendarDay, BTreeSet<i64>>> = BTreeMap::new();
    for ping in pings {
        let day = ping.calendar_day(calendar_year)?;
        if let Some(region_id) = ping.region_id {
            activity
                .entry(region_id)
                .or_default()
                .entry(day)
                .or_default()
                .insert(ping.entity_id);
        }
    }

    info!(regions = activity.len(), year = calendar_year, "Aggregating region activity");

    let mut rows = Vec::with_capacity(activity.len() * calendar.len());
    for (region_id, mut days) in activity {
        for &day in &calendar {
            rows.push(RegionDayRow {
                region_id,
                month: day.month(),
                day: day.day(),
                couriers: days.remove(&day).unwrap_or_default(),
            });
        }
    }
    Ok(rows)
}

/// Mean delivery duration per region, sorted by region id.
///
/// Only pings with a region and both delivery timestamps contribute.
pub fn region_delivery_hours(pings: &[Ping]) -> Vec<RegionDuration> {
    let mut totals: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for ping in pings {
        if let (Some(region_id), Some(hours)) = (ping.region_id, ping.delivery_hours()) {
            let entry = totals.entry(region_id).or_insert((0.0, 0));
            entry.0 += hours;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(region_id, (sum, deliveries))| RegionDuration {
            region_id,
            mean_hours: ((sum / deliveries as f64) * 100.0).round() / 100.0,
            deliveries,
        })
        .collect()
}
