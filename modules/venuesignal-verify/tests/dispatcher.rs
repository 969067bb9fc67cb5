use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use futures::StreamExt;
use venuesignal_common::VerificationConfig;
use venuesignal_verify::testing::{hit, MockJudge, MockSearcher};
use venuesignal_verify::{
    Dispatcher, FileCache, MemoryCache, RateLimiter, VerificationCache, VerificationEntry,
    VerificationRequest,
};

fn request(venue: &str) -> VerificationRequest {
    VerificationRequest::new(venue, "Roma", "05 ottobre 2025")
}

fn dispatcher(
    searcher: &Arc<MockSearcher>,
    judge: &Arc<MockJudge>,
    cache: Arc<dyn VerificationCache>,
) -> Dispatcher {
    Dispatcher::new(searcher.clone(), judge.clone(), cache, &VerificationConfig::default())
        .with_rate_limiter(Arc::new(RateLimiter::with_burst(6000, 100)))
}

fn dispatcher_with(
    searcher: &Arc<MockSearcher>,
    judge: &Arc<MockJudge>,
    config: &VerificationConfig,
    limiter: Arc<RateLimiter>,
) -> Dispatcher {
    Dispatcher::new(searcher.clone(), judge.clone(), Arc::new(MemoryCache::new()), config)
        .with_rate_limiter(limiter)
}

fn some_hits() -> Vec<venuesignal_verify::SearchHit> {
    vec![
        hit("https://a.it"),
        hit("https://b.it"),
        hit("https://c.it"),
        hit("https://d.it"),
        hit("https://e.it"),
    ]
}

#[tokio::test]
async fn second_call_within_ttl_makes_no_oracle_call() {
    let searcher = Arc::new(MockSearcher::new().with_default(some_hits()));
    let judge = Arc::new(MockJudge::confirming(0.9));
    let d = dispatcher(&searcher, &judge, Arc::new(MemoryCache::new()));

    let first = d.verify(request("Bar Centrale")).await;
    assert!(!first.cached);
    assert!(first.entry.exists);
    // Only the top three organic results reach the judge.
    assert_eq!(first.entry.evidence, vec!["https://a.it", "https://b.it", "https://c.it"]);
    assert_eq!((searcher.calls(), judge.calls()), (1, 1));

    let second = d.verify(request("  bar   CENTRALE ")).await;
    assert!(second.cached);
    assert_eq!(second.entry, first.entry);
    assert_eq!((searcher.calls(), judge.calls()), (1, 1));
}

#[tokio::test]
async fn failures_are_cached_and_not_retried() {
    let req = request("Bar Centrale");
    let searcher = Arc::new(MockSearcher::new().failing_on(&req.query(), "connection reset"));
    let judge = Arc::new(MockJudge::confirming(0.9));
    let d = dispatcher(&searcher, &judge, Arc::new(MemoryCache::new()));

    let first = d.verify(req.clone()).await;
    assert!(!first.entry.exists);
    assert_eq!(first.entry.confidence, 0.0);
    assert!(first.entry.evidence.is_empty());
    assert!(first.entry.error.as_deref().unwrap().contains("connection reset"));

    let second = d.verify(req.clone()).await;
    let third = d.verify(req).await;
    assert!(second.cached && third.cached);
    assert_eq!(searcher.calls(), 1);
    assert_eq!(judge.calls(), 0);
}

#[tokio::test]
async fn judge_failure_becomes_negative_entry() {
    let searcher = Arc::new(MockSearcher::new().with_default(some_hits()));
    let judge = Arc::new(MockJudge::failing("invalid JSON"));
    let d = dispatcher(&searcher, &judge, Arc::new(MemoryCache::new()));

    let outcome = d.verify(request("Bar Centrale")).await;
    assert!(!outcome.entry.exists);
    assert!(outcome.entry.evidence.is_empty());
    assert!(outcome.entry.error.as_deref().unwrap().starts_with("judge failed"));
}

#[tokio::test]
async fn empty_search_short_circuits_without_judge() {
    let searcher = Arc::new(MockSearcher::new());
    let judge = Arc::new(MockJudge::confirming(0.9));
    let d = dispatcher(&searcher, &judge, Arc::new(MemoryCache::new()));

    let outcome = d.verify(request("Bar Centrale")).await;
    assert!(!outcome.entry.exists);
    assert_eq!(outcome.entry.confidence, 0.1);
    assert!(outcome.entry.error.is_none());
    assert_eq!(judge.calls(), 0);

    assert!(d.verify(request("Bar Centrale")).await.cached);
    assert_eq!(searcher.calls(), 1);
}

#[tokio::test]
async fn one_failure_does_not_abort_the_batch() {
    let bad = request("Bar Rotto");
    let searcher = Arc::new(
        MockSearcher::new()
            .with_default(some_hits())
            .failing_on(&bad.query(), "HTTP 500"),
    );
    let judge = Arc::new(MockJudge::confirming(0.7));
    let d = dispatcher(&searcher, &judge, Arc::new(MemoryCache::new()));

    let outcomes = d
        .verify_all(vec![request("A"), bad.clone(), request("B"), request("C")])
        .await;

    assert_eq!(outcomes.len(), 4);
    let failed: Vec<_> = outcomes.iter().filter(|o| o.entry.is_error()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].key, bad.cache_key());
    assert_eq!(outcomes.iter().filter(|o| o.entry.exists).count(), 3);
}

#[tokio::test]
async fn duplicate_keys_in_a_batch_are_dispatched_once() {
    let searcher = Arc::new(MockSearcher::new().with_default(some_hits()));
    let judge = Arc::new(MockJudge::confirming(0.7));
    let d = dispatcher(&searcher, &judge, Arc::new(MemoryCache::new()));

    let outcomes: Vec<_> = d
        .verify_stream(vec![request("A"), request(" a "), request("B")])
        .collect()
        .await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(searcher.calls(), 2);
}

#[tokio::test]
async fn expired_entries_are_recomputed() {
    let cache = Arc::new(MemoryCache::new());
    let fresh_failure = request("Recent");
    let stale_ok = request("Stale");
    let stale_failure = request("Old failure");

    let now = Utc::now();
    cache
        .put(&fresh_failure.cache_key(), &VerificationEntry::failure("timeout", now - Duration::minutes(10)))
        .await
        .unwrap();
    cache
        .put(&stale_ok.cache_key(), &VerificationEntry::no_results(now - Duration::hours(25)))
        .await
        .unwrap();
    cache
        .put(&stale_failure.cache_key(), &VerificationEntry::failure("timeout", now - Duration::hours(2)))
        .await
        .unwrap();

    let searcher = Arc::new(MockSearcher::new().with_default(some_hits()));
    let judge = Arc::new(MockJudge::confirming(0.8));
    let d = dispatcher(&searcher, &judge, cache.clone());

    assert!(d.verify(fresh_failure).await.cached);
    assert_eq!(searcher.calls(), 0);

    let recomputed = d.verify(stale_ok.clone()).await;
    assert!(!recomputed.cached);
    assert!(recomputed.entry.exists);

    assert!(!d.verify(stale_failure).await.cached);
    assert_eq!(searcher.calls(), 2);

    // The replacement is what the cache now holds.
    assert_eq!(cache.get(&stale_ok.cache_key()).await, Some(recomputed.entry));
}

#[tokio::test]
async fn file_cache_survives_dispatcher_restart() {
    let dir = tempfile::tempdir().unwrap();
    let searcher = Arc::new(MockSearcher::new().with_default(some_hits()));
    let judge = Arc::new(MockJudge::confirming(0.8));

    let first = dispatcher(&searcher, &judge, Arc::new(FileCache::new(dir.path().join("verify"))));
    let outcome = first.verify(request("Bar Centrale")).await;
    assert!(dir
        .path()
        .join("verify")
        .join(format!("{}.json", outcome.key))
        .is_file());

    let second = dispatcher(&searcher, &judge, Arc::new(FileCache::new(dir.path().join("verify"))));
    assert!(second.verify(request("Bar Centrale")).await.cached);
    assert_eq!(searcher.calls(), 1);
}

#[tokio::test]
async fn corrupt_cache_file_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let req = request("Bar Centrale");
    let path = dir.path().join(format!("{}.json", req.cache_key()));
    std::fs::write(&path, b"{ not json").unwrap();

    let cache = FileCache::new(dir.path());
    assert!(cache.get(&req.cache_key()).await.is_none());
    assert!(!path.exists());

    let searcher = Arc::new(MockSearcher::new().with_default(some_hits()));
    let judge = Arc::new(MockJudge::confirming(0.8));
    let d = dispatcher(&searcher, &judge, Arc::new(FileCache::new(dir.path())));
    std::fs::write(&path, b"garbage").unwrap();

    let outcome = d.verify(req).await;
    assert!(!outcome.cached);
    assert_eq!(searcher.calls(), 1);

    let stored: VerificationEntry = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(stored, outcome.entry);
}

#[tokio::test]
async fn outcomes_arrive_in_completion_order() {
    let slow = request("Lento");
    let searcher = Arc::new(
        MockSearcher::new()
            .with_default(some_hits())
            .slow_on(&slow.query(), StdDuration::from_millis(300)),
    );
    let judge = Arc::new(MockJudge::confirming(0.8));
    let d = dispatcher(&searcher, &judge, Arc::new(MemoryCache::new()));

    let outcomes: Vec<_> = d
        .verify_stream(vec![slow.clone(), request("Veloce"), request("Rapido")])
        .collect()
        .await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[2].key, slow.cache_key());
    assert_ne!(outcomes[0].key, slow.cache_key());
}

#[tokio::test]
async fn in_flight_searches_never_exceed_workers() {
    let searcher = Arc::new(
        MockSearcher::new()
            .with_default(some_hits())
            .with_delay(StdDuration::from_millis(50)),
    );
    let judge = Arc::new(MockJudge::confirming(0.8));
    let config = VerificationConfig {
        workers: 2,
        ..VerificationConfig::default()
    };
    let d = dispatcher_with(
        &searcher,
        &judge,
        &config,
        Arc::new(RateLimiter::with_burst(6000, 100)),
    );

    let requests: Vec<_> = ["A", "B", "C", "D", "E", "F"].into_iter().map(request).collect();
    let outcomes = d.verify_all(requests).await;

    assert_eq!(outcomes.len(), 6);
    assert_eq!(searcher.calls(), 6);
    assert_eq!(searcher.peak_concurrency(), 2);
}

#[tokio::test]
async fn shared_limiter_gates_the_judge_step() {
    let judged = request("Confermato");
    let waiting = request("Altro");
    let searcher = Arc::new(
        MockSearcher::new()
            .on_query(&judged.query(), some_hits())
            .on_query(&waiting.query(), some_hits()),
    );
    let judge = Arc::new(MockJudge::confirming(0.8));
    // One permit, then one more per minute.
    let limiter = Arc::new(RateLimiter::per_minute(1));
    let d = dispatcher_with(&searcher, &judge, &VerificationConfig::default(), limiter.clone());

    // An empty search never reaches the judge, so it leaves the permit alone.
    let empty = d.verify(request("Sconosciuto")).await;
    assert_eq!(empty.entry.confidence, 0.1);

    let outcome = d.verify(judged).await;
    assert!(outcome.entry.exists);
    assert_eq!(judge.calls(), 1);
    assert!(!limiter.try_acquire());

    // The next judgment has to wait for a permit.
    let blocked = tokio::time::timeout(StdDuration::from_millis(200), d.verify(waiting)).await;
    assert!(blocked.is_err());
    assert_eq!(searcher.calls(), 3);
    assert_eq!(judge.calls(), 1);
}
