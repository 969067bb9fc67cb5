use anyhow::Result;
use chrono::Local;
use clap::Args;
use serde_json::json;
use tracing::info;

use venuesignal_common::ScoreMode;
use venuesignal_recurrence::{
    score_recurrence, summarize, yearly_distribution, DayOfYear, RecurrenceFilter,
};

use super::print_json;
use crate::regions::select_cities;
use crate::Context;

#[derive(Args)]
pub struct RecurrenceArgs {
    /// Target day as DD/MM. Defaults to tomorrow.
    #[arg(long = "on")]
    target: Option<DayOfYear>,

    /// Region to include (repeatable). Defaults to every allowed city.
    #[arg(long = "city")]
    cities: Vec<String>,

    #[arg(long = "district")]
    districts: Vec<String>,

    /// Restrict to these raw event genres
    #[arg(long = "genre")]
    genres: Vec<String>,

    #[arg(long = "venue")]
    venues: Vec<String>,

    /// Rank by recurrence alone, ignoring base priority
    #[arg(long)]
    recurrence_only: bool,

    /// Only print the first N results
    #[arg(long)]
    limit: Option<usize>,

    /// Also print the day-by-day event distribution for this year
    #[arg(long)]
    year: Option<i32>,
}

pub fn run(ctx: &Context, args: RecurrenceArgs) -> Result<()> {
    let today = Local::now().date_naive();
    let target = args.target.unwrap_or_else(|| DayOfYear::tomorrow(today));
    let mode = if args.recurrence_only {
        ScoreMode::RecurrenceOnly
    } else {
        ctx.file.recurrence.score_mode
    };

    let regions = select_cities(&ctx.store, &ctx.file.identity.allowed_regions, &args.cities)?;
    let log = ctx.store.event_log(&regions)?;
    let priorities = ctx.store.priority_table(&regions);

    let filter = RecurrenceFilter {
        localities: regions,
        districts: args.districts,
        genres: args.genres,
        venues: args.venues,
    };

    info!(
        day = %target,
        ?mode,
        years = log.years.len(),
        events = log.events.len(),
        venues = priorities.len(),
        "Recurrence inputs loaded"
    );

    let mut results = score_recurrence(&log, &priorities, target, &filter, mode, today);
    let summary = summarize(&results);
    if let Some(limit) = args.limit {
        results.truncate(limit);
    }

    let distribution = args
        .year
        .map(|year| yearly_distribution(&log, &priorities, year, &filter, today));

    print_json(&json!({
        "target": target.to_string(),
        "mode": mode,
        "summary": summary,
        "results": results,
        "distribution": distribution,
    }))
}
