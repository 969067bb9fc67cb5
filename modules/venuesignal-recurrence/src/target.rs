use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::TargetError;

/// A calendar day independent of year, e.g. 31 October.
///
/// The day is only checked against `1..=31`; a day that does not exist in a
/// given month (30 February) is a valid target that simply never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DayOfYear {
    day: u32,
    month: u32,
}

impl DayOfYear {
    pub fn new(day: u32, month: u32) -> Result<Self, TargetError> {
        if !(1..=12).contains(&month) {
            return Err(TargetError::Month(month));
        }
        if !(1..=31).contains(&day) {
            return Err(TargetError::Day(day));
        }
        Ok(Self { day, month })
    }

    /// The day after `today`, the default target for planning.
    pub fn tomorrow(today: NaiveDate) -> Self {
        let next = today + Duration::days(1);
        Self {
            day: next.day(),
            month: next.month(),
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        date.day() == self.day && date.month() == self.month
    }

    /// The target in `year`, falling back to day `min(day, 28)` of the month
    /// when the exact date does not exist that year.
    pub fn reference_date(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
            .or_else(|| NaiveDate::from_ymd_opt(year, self.month, self.day.min(28)))
    }

    /// Whether the target has already occurred (or is today) in `today`'s year.
    pub fn has_occurred(&self, today: NaiveDate) -> bool {
        self.reference_date(today.year())
            .map(|d| d <= today)
            .unwrap_or(false)
    }
}

impl FromStr for DayOfYear {
    type Err = TargetError;

    /// Parse `DD/MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = || TargetError::Format(s.to_string());
        let (day, month) = s.trim().split_once('/').ok_or_else(format)?;
        let day = day.trim().parse().map_err(|_| format())?;
        let month = month.trim().parse().map_err(|_| format())?;
        Self::new(day, month)
    }
}

impl fmt::Display for DayOfYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.day, self.month)
    }
}

/// Years that count in the recurrence denominator: every available year
/// before `today`'s, plus the current one once the target has occurred.
pub fn eligible_years(
    available: &BTreeSet<i32>,
    target: DayOfYear,
    today: NaiveDate,
) -> BTreeSet<i32> {
    let current = today.year();
    let include_current = target.has_occurred(today);
    available
        .iter()
        .copied()
        .filter(|y| *y < current || (include_current && *y == current))
        .collect()
}
