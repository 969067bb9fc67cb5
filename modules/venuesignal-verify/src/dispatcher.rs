use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use tracing::{info, warn};
use venuesignal_common::VerificationConfig;

use crate::cache::{VerificationCache, VerificationEntry};
use crate::key::VerificationRequest;
use crate::oracle::{EventJudge, EventSearcher};
use crate::rate_limit::RateLimiter;

/// Result for one triple, tagged with its cache key so callers can correlate
/// results that arrive in completion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationOutcome {
    pub key: String,
    pub request: VerificationRequest,
    pub entry: VerificationEntry,
    /// `true` when served from the cache without an oracle call.
    pub cached: bool,
}

/// Verifies triples through a cache-first, rate-limited oracle with a bounded
/// number of concurrent workers.
pub struct Dispatcher {
    searcher: Arc<dyn EventSearcher>,
    judge: Arc<dyn EventJudge>,
    cache: Arc<dyn VerificationCache>,
    limiter: Arc<RateLimiter>,
    workers: usize,
    ttl: Duration,
    error_ttl: Duration,
    evidence_items: usize,
}

impl Dispatcher {
    pub fn new(
        searcher: Arc<dyn EventSearcher>,
        judge: Arc<dyn EventJudge>,
        cache: Arc<dyn VerificationCache>,
        config: &VerificationConfig,
    ) -> Self {
        Self {
            searcher,
            judge,
            cache,
            limiter: Arc::new(RateLimiter::per_minute(config.requests_per_minute)),
            workers: config.workers.max(1),
            ttl: Duration::hours(config.ttl_hours),
            error_ttl: Duration::hours(config.error_ttl_hours),
            evidence_items: config.evidence_items,
        }
    }

    /// Share a limiter with other dispatchers, or substitute one in tests.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Verify one triple: a fresh cache entry is returned as is, otherwise the
    /// oracle is consulted and its answer (including a failure) is cached.
    pub async fn verify(&self, request: VerificationRequest) -> VerificationOutcome {
        let key = request.cache_key();

        if let Some(entry) = self.cache.get(&key).await {
            if entry.is_fresh(Utc::now(), self.ttl, self.error_ttl) {
                return VerificationOutcome {
                    key,
                    request,
                    entry,
                    cached: true,
                };
            }
        }

        let entry = self.consult(&request).await;
        if let Err(e) = self.cache.put(&key, &entry).await {
            warn!(key = key.as_str(), error = %e, "Failed to persist verification entry");
        }

        VerificationOutcome {
            key,
            request,
            entry,
            cached: false,
        }
    }

    /// Verify a batch with at most `workers` triples in flight. Outcomes are
    /// yielded as they complete; duplicate keys are dispatched once.
    pub fn verify_stream(
        &self,
        requests: Vec<VerificationRequest>,
    ) -> impl Stream<Item = VerificationOutcome> + '_ {
        let mut seen = HashSet::new();
        let unique: Vec<VerificationRequest> = requests
            .into_iter()
            .filter(|r| seen.insert(r.cache_key()))
            .collect();

        info!(
            requests = unique.len(),
            workers = self.workers,
            rpm = self.limiter.requests_per_minute(),
            "Dispatching verification batch"
        );

        stream::iter(unique)
            .map(move |request| self.verify(request))
            .buffer_unordered(self.workers)
    }

    /// Verify a batch and collect every outcome, in completion order.
    pub async fn verify_all(&self, requests: Vec<VerificationRequest>) -> Vec<VerificationOutcome> {
        let outcomes: Vec<VerificationOutcome> = self.verify_stream(requests).collect().await;

        let cached = outcomes.iter().filter(|o| o.cached).count();
        let failed = outcomes.iter().filter(|o| o.entry.is_error()).count();
        let confirmed = outcomes.iter().filter(|o| o.entry.exists).count();
        info!(
            total = outcomes.len(),
            cached,
            failed,
            confirmed,
            "Verification batch complete"
        );
        outcomes
    }

    /// Search, then judge. Every failure becomes a negative, error-tagged entry.
    async fn consult(&self, request: &VerificationRequest) -> VerificationEntry {
        let query = request.query();

        let mut hits = match self.searcher.search(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(query = query.as_str(), error = %e, "Search failed");
                return VerificationEntry::failure(format!("search failed: {e:#}"), Utc::now());
            }
        };

        if hits.is_empty() {
            info!(query = query.as_str(), "No search results");
            return VerificationEntry::no_results(Utc::now());
        }
        hits.truncate(self.evidence_items.max(1));

        self.limiter.acquire().await;

        match self.judge.judge(&hits, request).await {
            Ok(verdict) => VerificationEntry::from_verdict(verdict, Utc::now()),
            Err(e) => {
                warn!(query = query.as_str(), error = %e, "Judge failed");
                VerificationEntry::failure(format!("judge failed: {e:#}"), Utc::now())
            }
        }
    }
}
