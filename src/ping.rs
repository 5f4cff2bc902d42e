//! Delivery pings and timestamp resolution.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::calendar::CalendarDay;
use crate::error::{BakeError, Result};
use crate::point::GeoPoint;

const FULL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

/// One observed delivery event.
#[derive(Debug, Clone, PartialEq)]
pub struct Ping {
    pub entity_id: i64,
    pub timestamp: NaiveDateTime,
    pub location: GeoPoint,
    /// Unset when the source had no (or no numeric) region.
    pub region_id: Option<i64>,
    pub accepted_at: Option<NaiveDateTime>,
    pub delivered_at: Option<NaiveDateTime>,
}

impl Ping {
    pub fn new(entity_id: i64, timestamp: NaiveDateTime, location: GeoPoint, region_id: Option<i64>) -> Self {
        Self {
            entity_id,
            timestamp,
            location,
            region_id,
            accepted_at: None,
            delivered_at: None,
        }
    }

    pub fn with_delivery_window(mut self, accepted_at: NaiveDateTime, delivered_at: NaiveDateTime) -> Self {
        self.accepted_at = Some(accepted_at);
        self.delivered_at = Some(delivered_at);
        self
    }

    /// Resolve the bucket this ping falls into for `year`.
    ///
    /// A ping stamped in another year has no place in the dense index for
    /// `year` and is reported rather than dropped.
    pub fn calendar_day(&self, year: i32) -> Result<CalendarDay> {
        if self.timestamp.year() != year {
            return Err(BakeError::MalformedPing {
                entity_id: self.entity_id,
                timestamp: self.timestamp.format(FULL_FORMAT).to_string(),
                reason: format!("timestamp is outside calendar year {}", year),
            });
        }
        CalendarDay::new(year, self.timestamp.month(), self.timestamp.day())
    }

    /// Hours between acceptance and delivery, when both are known.
    pub fn delivery_hours(&self) -> Option<f64> {
        let accepted = self.accepted_at?;
        let delivered = self.delivered_at?;
        Some((delivered - accepted).num_seconds() as f64 / 3600.0)
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS`, or `MM-DD HH:MM:SS` placed in `year`.
///
/// Returns `None` for text in neither format and for year-less dates that do
/// not exist in `year` (February 29 outside leap years).
pub fn parse_timestamp(raw: &str, year: i32) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, FULL_FORMAT) {
        return Some(timestamp);
    }

    // chrono cannot parse a date without a year, so resolve the parts by hand.
    let (date, time) = raw.split_once(' ')?;
    let (month, day) = date.split_once('-')?;
    let date = NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)?;
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).ok()?;
    Some(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, FULL_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_full_timestamp() {
        assert_eq!(parse_timestamp("2022-06-05 09:30:00", 2022), Some(ts("2022-06-05 09:30:00")));
    }

    #[test]
    fn test_parse_yearless_timestamp() {
        assert_eq!(parse_timestamp("06-05 09:30:00", 2022), Some(ts("2022-06-05 09:30:00")));
        assert_eq!(parse_timestamp(" 12-31 23:59:59 ", 2022), Some(ts("2022-12-31 23:59:59")));
    }

    #[test]
    fn test_yearless_leap_day_depends_on_year() {
        assert!(parse_timestamp("02-29 08:00:00", 2024).is_some());
        assert!(parse_timestamp("02-29 08:00:00", 2023).is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("", 2022).is_none());
        assert!(parse_timestamp("yesterday", 2022).is_none());
        assert!(parse_timestamp("13-01 08:00:00", 2022).is_none());
        assert!(parse_timestamp("06-05 25:00:00", 2022).is_none());
    }

    #[test]
    fn test_calendar_day_in_year() {
        let ping = Ping::new(7, ts("2022-03-14 10:00:00"), GeoPoint::new(31.2, 121.4).unwrap(), None);
        let day = ping.calendar_day(2022).unwrap();
        assert_eq!((day.month(), day.day()), (3, 14));
    }

    #[test]
    fn test_calendar_day_other_year_is_malformed() {
        let ping = Ping::new(7, ts("2021-03-14 10:00:00"), GeoPoint::new(31.2, 121.4).unwrap(), None);
        match ping.calendar_day(2022) {
            Err(BakeError::MalformedPing { entity_id, timestamp, .. }) => {
                assert_eq!(entity_id, 7);
                assert_eq!(timestamp, "2021-03-14 10:00:00");
            }
            other => panic!("expected MalformedPing, got {:?}", other),
        }
    }

    #[test]
    fn test_delivery_hours() {
        let ping = Ping::new(1, ts("2022-03-14 10:00:00"), GeoPoint::new(0.0, 0.0).unwrap(), Some(3))
            .with_delivery_window(ts("2022-03-14 08:00:00"), ts("2022-03-14 10:30:00"));
        assert_eq!(ping.delivery_hours(), Some(2.5));

        let bare = Ping::new(1, ts("2022-03-14 10:00:00"), GeoPoint::new(0.0, 0.0).unwrap(), Some(3));
        assert_eq!(bare.delivery_hours(), None);
    }
}
