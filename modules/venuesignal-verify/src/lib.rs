//! Event-existence verification: a cached, rate-limited, bounded-concurrency
//! dispatcher over a search + LLM-judge oracle.

pub mod cache;
pub mod dates;
pub mod dispatcher;
pub mod error;
pub mod judge;
pub mod key;
pub mod oracle;
pub mod rate_limit;
pub mod serper;
pub mod targets;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use cache::{FileCache, MemoryCache, VerificationCache, VerificationEntry};
pub use dates::{expand_range, italian_label};
pub use dispatcher::{Dispatcher, VerificationOutcome};
pub use error::VerifyError;
pub use judge::LlmJudge;
pub use key::VerificationRequest;
pub use oracle::{EventJudge, EventSearcher, SearchHit, Verdict};
pub use rate_limit::RateLimiter;
pub use serper::SerperSearcher;
pub use targets::{requests_for, top_venues};
