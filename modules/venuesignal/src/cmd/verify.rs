use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use futures::StreamExt;
use tracing::info;

use venuesignal_verify::{
    expand_range, requests_for, top_venues, Dispatcher, FileCache, LlmJudge, SerperSearcher,
};

use crate::regions::select_cities;
use crate::Context;

#[derive(Args)]
pub struct VerifyArgs {
    /// First date to verify (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Last date, inclusive. Defaults to `start`.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Number of venues to verify, by base priority
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// City to draw venues from (repeatable). Defaults to every allowed city.
    #[arg(long = "city")]
    cities: Vec<String>,
}

/// Streams one JSON line per verified (venue, date) as results complete.
pub async fn run(ctx: &Context, args: VerifyArgs) -> Result<()> {
    let settings = &ctx.file.verification;
    let dates = expand_range(
        args.start,
        args.end.unwrap_or(args.start),
        settings.max_range_days,
    )?;

    let cities = select_cities(&ctx.store, &ctx.file.identity.allowed_regions, &args.cities)?;
    let venues = ctx.store.all_venues(&cities);
    let targets = top_venues(&venues, args.top);
    let requests = requests_for(&targets, &dates);

    let searcher = SerperSearcher::new(&ctx.config.serper_api_key, settings)?;
    let judge = LlmJudge::gemini(
        &ctx.config.gemini_api_key,
        ctx.config.gemini_base_url.as_deref(),
        settings,
    );
    let cache = FileCache::new(&ctx.config.cache_dir);
    let dispatcher = Dispatcher::new(Arc::new(searcher), Arc::new(judge), Arc::new(cache), settings);

    info!(
        venues = targets.len(),
        dates = dates.len(),
        requests = requests.len(),
        workers = dispatcher.workers(),
        "Starting verification"
    );

    let mut confirmed = 0usize;
    let mut failed = 0usize;
    let mut total = 0usize;
    let mut outcomes = std::pin::pin!(dispatcher.verify_stream(requests));
    while let Some(outcome) = outcomes.next().await {
        total += 1;
        if outcome.entry.exists {
            confirmed += 1;
        }
        if outcome.entry.is_error() {
            failed += 1;
        }
        println!("{}", serde_json::to_string(&outcome)?);
    }

    info!(total, confirmed, failed, "Verification finished");
    Ok(())
}
