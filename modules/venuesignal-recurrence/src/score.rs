use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};
use venuesignal_common::{EventLog, EventRecord, PriorityTable, ScoreMode};

use crate::filter::RecurrenceFilter;
use crate::target::{eligible_years, DayOfYear};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetail {
    pub year: i32,
    pub starts_at: NaiveDateTime,
    pub locality: String,
    pub municipality: Option<String>,
}

/// Ranking row for one venue and one target day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurrenceResult {
    pub venue: String,
    pub locality: String,
    pub genre: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub municipality: Option<String>,
    /// Eligible years in which the venue held an event on the target day.
    pub matching_years: Vec<i32>,
    pub eligible_years: usize,
    pub total_events: usize,
    pub recurrence: f64,
    pub base_priority: f64,
    pub final_score: f64,
    pub events: Vec<EventDetail>,
}

/// Rank venues by how consistently they held an event on `target`.
///
/// Only venues in `priorities` with a base score are ranked, and only events on
/// or before `today` count. Results are sorted by final score, highest first;
/// ties keep priority-table order.
pub fn score_recurrence(
    log: &EventLog,
    priorities: &PriorityTable,
    target: DayOfYear,
    filter: &RecurrenceFilter,
    mode: ScoreMode,
    today: NaiveDate,
) -> Vec<RecurrenceResult> {
    let eligible = eligible_years(&log.years, target, today);
    let denominator = eligible.len();

    let mut by_venue: HashMap<(&str, &str), Vec<&EventRecord>> = HashMap::new();
    for event in log.events.iter().filter(|e| {
        let date = e.date();
        target.matches(date) && date <= today && eligible.contains(&e.year) && filter.matches(e)
    }) {
        by_venue
            .entry((event.venue.as_str(), event.locality.as_str()))
            .or_default()
            .push(event);
    }

    info!(
        day = %target,
        eligible = ?eligible,
        venues_with_events = by_venue.len(),
        "Scoring recurrence"
    );

    let mut unscored = 0usize;
    let mut results: Vec<RecurrenceResult> = Vec::new();

    for row in priorities.rows() {
        if !filter.allows_locality(&row.locality) {
            continue;
        }
        let Some(events) = by_venue.get(&(row.venue.as_str(), row.locality.as_str())) else {
            continue;
        };
        let Some(base) = row.score else {
            unscored += 1;
            continue;
        };

        let years: BTreeSet<i32> = events.iter().map(|e| e.year).collect();
        let recurrence = if denominator == 0 {
            0.0
        } else {
            years.len() as f64 / denominator as f64
        };
        let final_score = match mode {
            ScoreMode::Combined => recurrence * base,
            ScoreMode::RecurrenceOnly => recurrence,
        };

        let first = events[0];
        results.push(RecurrenceResult {
            venue: row.venue.clone(),
            locality: row.locality.clone(),
            genre: first.genre.clone(),
            address: first.address.clone(),
            district: first.district.clone(),
            municipality: first.municipality.clone(),
            matching_years: years.into_iter().collect(),
            eligible_years: denominator,
            total_events: events.len(),
            recurrence,
            base_priority: base,
            final_score,
            events: events
                .iter()
                .map(|e| EventDetail {
                    year: e.year,
                    starts_at: e.starts_at,
                    locality: e.locality.clone(),
                    municipality: e.municipality.clone(),
                })
                .collect(),
        });
    }

    if unscored > 0 {
        debug!(unscored, "Venues with events but no base priority were not ranked");
    }

    results.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    results
}
