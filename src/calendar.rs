//! Calendar-valid (month, day) partitions of a year.

use chrono::{Datelike, NaiveDate};

use crate::error::{BakeError, Result};

/// A (month, day) pair known to exist in some calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay {
    month: u32,
    day: u32,
}

impl CalendarDay {
    /// Rejects pairs like February 30, or February 29 outside leap years.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from)
            .ok_or(BakeError::CalendarInconsistency { year, month, day })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Every day of `year` in chronological order (365 or 366 entries).
pub fn days_of_year(year: i32) -> Result<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(BakeError::InvalidYear(year))?;

    Ok(first
        .iter_days()
        .take_while(|date| date.year() == year)
        .map(CalendarDay::from)
        .collect())
}
