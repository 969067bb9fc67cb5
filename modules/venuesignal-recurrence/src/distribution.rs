use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use venuesignal_common::{EventLog, PriorityTable};

use crate::filter::RecurrenceFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub month: u32,
    pub day: u32,
    pub count: usize,
}

impl DayCount {
    /// `DD/MM`
    pub fn label(&self) -> String {
        format!("{:02}/{:02}", self.day, self.month)
    }
}

/// Realized events per calendar day for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearDistribution {
    pub year: i32,
    /// Sorted by (month, day); days without events are absent.
    pub days: Vec<DayCount>,
    pub busiest: Option<DayCount>,
    pub total: usize,
}

/// Count events of `year` per day, restricted to venues known to the
/// priority table and to dates on or before `today`.
pub fn yearly_distribution(
    log: &EventLog,
    priorities: &PriorityTable,
    year: i32,
    filter: &RecurrenceFilter,
    today: NaiveDate,
) -> YearDistribution {
    let mut counts: BTreeMap<(u32, u32), usize> = BTreeMap::new();
    for event in &log.events {
        let date = event.date();
        if event.year != year || date > today || !filter.matches(event) {
            continue;
        }
        if !priorities.contains(&event.venue, &event.locality) {
            continue;
        }
        *counts.entry((date.month(), date.day())).or_default() += 1;
    }

    let days: Vec<DayCount> = counts
        .into_iter()
        .map(|((month, day), count)| DayCount { month, day, count })
        .collect();

    // Earliest day wins ties.
    let busiest = days
        .iter()
        .copied()
        .fold(None, |best: Option<DayCount>, d| match best {
            Some(b) if b.count >= d.count => Some(b),
            _ => Some(d),
        });

    YearDistribution {
        year,
        total: days.iter().map(|d| d.count).sum(),
        days,
        busiest,
    }
}
