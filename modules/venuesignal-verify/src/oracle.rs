use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::key::VerificationRequest;

/// One organic search result handed to the judge as evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// The judge's answer for one triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub exists: bool,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub evidence: Vec<String>,
}

// --- Oracle traits ---

#[async_trait]
pub trait EventSearcher: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

#[async_trait]
pub trait EventJudge: Send + Sync {
    async fn judge(&self, evidence: &[SearchHit], request: &VerificationRequest) -> Result<Verdict>;
}
