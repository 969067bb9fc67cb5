use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One (venue, locality, date) triple to verify. `date` is the human label
/// used in the search query, e.g. `"05 ottobre 2025"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub venue: String,
    pub locality: String,
    pub date: String,
}

impl VerificationRequest {
    pub fn new(
        venue: impl Into<String>,
        locality: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            venue: venue.into(),
            locality: locality.into(),
            date: date.into(),
        }
    }

    /// Content hash identifying this triple in the cache.
    ///
    /// SHA-256 hex of the JSON array of the normalized fields, so case and
    /// whitespace differences map to the same entry.
    pub fn cache_key(&self) -> String {
        let normalized = [
            normalize(&self.venue),
            normalize(&self.locality),
            normalize(&self.date),
        ];
        let json = serde_json::to_string(&normalized).unwrap_or_default();
        hex::encode(Sha256::digest(json.as_bytes()))
    }

    /// Search engine query for this triple.
    pub fn query(&self) -> String {
        format!(
            "{} {} eventi {}",
            collapse(&self.venue),
            collapse(&self.locality),
            collapse(&self.date)
        )
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim, collapse internal whitespace and lowercase.
pub fn normalize(s: &str) -> String {
    collapse(s).to_lowercase()
}
