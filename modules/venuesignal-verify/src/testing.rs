// Test mocks for the verification oracle.
//
// - MockSearcher (EventSearcher): query → canned hits, or a forced failure
// - MockJudge (EventJudge): one canned verdict, or a forced failure
//
// Both count their calls so tests can assert that the cache short-circuits.
// MockSearcher also records its peak number of concurrent searches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::key::VerificationRequest;
use crate::oracle::{EventJudge, EventSearcher, SearchHit, Verdict};

pub fn hit(url: &str) -> SearchHit {
    SearchHit {
        title: format!("Evento su {url}"),
        snippet: "Serata in programma".to_string(),
        url: url.to_string(),
    }
}

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

/// Returns registered hits per query, the default hits otherwise.
/// Builder pattern: `.on_query()`, `.failing_on()`, `.with_default()`,
/// `.with_delay()`, `.slow_on()`.
pub struct MockSearcher {
    results: HashMap<String, Vec<SearchHit>>,
    failures: HashMap<String, String>,
    default: Vec<SearchHit>,
    delay: Option<Duration>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            failures: HashMap::new(),
            default: Vec::new(),
            delay: None,
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn on_query(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.results.insert(query.to_string(), hits);
        self
    }

    pub fn failing_on(mut self, query: &str, message: &str) -> Self {
        self.failures.insert(query.to_string(), message.to_string());
        self
    }

    pub fn with_default(mut self, hits: Vec<SearchHit>) -> Self {
        self.default = hits;
        self
    }

    /// Sleep before answering every query.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep for `delay` before answering `query`, overriding `with_delay`.
    pub fn slow_on(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most searches ever in progress at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSearcher for MockSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(query).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = self.failures.get(query) {
            bail!("MockSearcher: {message}");
        }
        Ok(self
            .results
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}

// ---------------------------------------------------------------------------
// MockJudge
// ---------------------------------------------------------------------------

/// Confirms every triple with the evidence URLs it was given, unless told to fail.
pub struct MockJudge {
    confidence: f64,
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl MockJudge {
    pub fn confirming(confidence: f64) -> Self {
        Self {
            confidence,
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            confidence: 0.0,
            fail_with: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventJudge for MockJudge {
    async fn judge(&self, evidence: &[SearchHit], _request: &VerificationRequest) -> Result<Verdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            bail!("MockJudge: {message}");
        }
        Ok(Verdict {
            exists: true,
            confidence: self.confidence,
            evidence: evidence.iter().map(|h| h.url.clone()).collect(),
        })
    }
}
