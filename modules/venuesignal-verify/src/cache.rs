use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::oracle::Verdict;

/// Confidence recorded when the search step finds nothing at all.
pub const NO_RESULTS_CONFIDENCE: f64 = 0.1;

/// Cached outcome for one triple. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationEntry {
    pub exists: bool,
    pub confidence: f64,
    pub evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VerificationEntry {
    pub fn from_verdict(verdict: Verdict, now: DateTime<Utc>) -> Self {
        Self {
            exists: verdict.exists,
            confidence: verdict.confidence,
            evidence: verdict.evidence,
            error: None,
            created_at: now,
        }
    }

    /// Negative answer for a search that returned no results.
    pub fn no_results(now: DateTime<Utc>) -> Self {
        Self {
            exists: false,
            confidence: NO_RESULTS_CONFIDENCE,
            evidence: Vec::new(),
            error: None,
            created_at: now,
        }
    }

    /// Negative answer recording an oracle failure.
    pub fn failure(note: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            exists: false,
            confidence: 0.0,
            evidence: Vec::new(),
            error: Some(note.into()),
            created_at: now,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Error entries expire after `error_ttl`, everything else after `ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration, error_ttl: Duration) -> bool {
        let limit = if self.is_error() { error_ttl } else { ttl };
        now.signed_duration_since(self.created_at) < limit
    }
}

// --- Cache trait ---

/// Key → entry store. Reads never fail: anything unreadable is a miss.
#[async_trait]
pub trait VerificationCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<VerificationEntry>;
    async fn put(&self, key: &str, entry: &VerificationEntry) -> Result<()>;
}

// --- FileCache ---

/// One JSON document per key, `{dir}/{key}.json`.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl VerificationCache for FileCache {
    async fn get(&self, key: &str) -> Option<VerificationEntry> {
        let path = self.path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache entry, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache entry, deleting");
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    debug!(path = %path.display(), error = %e, "Failed to delete corrupt cache entry");
                }
                None
            }
        }
    }

    async fn put(&self, key: &str, entry: &VerificationEntry) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create cache dir {}", self.dir.display()))?;

        let path = self.path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let body = serde_json::to_vec_pretty(entry)?;

        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to move cache entry into {}", path.display()))?;
        Ok(())
    }
}

// --- MemoryCache ---

/// In-process cache, for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, VerificationEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, VerificationEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl VerificationCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<VerificationEntry> {
        self.lock().get(key).cloned()
    }

    async fn put(&self, key: &str, entry: &VerificationEntry) -> Result<()> {
        self.lock().insert(key.to_string(), entry.clone());
        Ok(())
    }
}
