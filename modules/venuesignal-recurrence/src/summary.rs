use serde::Serialize;

use crate::score::RecurrenceResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurrenceSummary {
    pub venue_count: usize,
    pub mean_final_score: f64,
    /// Venues that held an event on the target day in every eligible year.
    pub full_recurrence: usize,
    pub total_events: usize,
}

pub fn summarize(results: &[RecurrenceResult]) -> RecurrenceSummary {
    let mean_final_score = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.final_score).sum::<f64>() / results.len() as f64
    };
    RecurrenceSummary {
        venue_count: results.len(),
        mean_final_score,
        full_recurrence: results.iter().filter(|r| r.recurrence == 1.0).count(),
        total_events: results.iter().map(|r| r.total_events).sum(),
    }
}
