use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML-backed engine tunables. Secrets and paths stay as env vars.
/// Every section is optional; omitted values take the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub identity: IdentityConfig,
    pub spatial: SpatialConfig,
    pub recurrence: RecurrenceConfig,
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Genres shown individually; everything else is bucketed as "Altro".
    pub priority_genres: Vec<String>,
    /// Localities the operator may see. Empty means every available city.
    pub allowed_regions: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            priority_genres: vec!["Bar".to_string(), "Discoteca".to_string()],
            allowed_regions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpatialConfig {
    /// Resolution used for the area fallback when a cell id cannot be decoded.
    pub resolution: u8,
    pub lower_percentile: f64,
    pub upper_percentile: f64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            resolution: 8,
            lower_percentile: 5.0,
            upper_percentile: 95.0,
        }
    }
}

/// How the recurrence ranking combines its two inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// `recurrence × base priority`
    #[default]
    Combined,
    /// Rank by recurrence alone.
    RecurrenceOnly,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecurrenceConfig {
    pub score_mode: ScoreMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerificationConfig {
    pub workers: usize,
    /// Ceiling on judge calls, shared by all workers.
    pub requests_per_minute: u32,
    pub ttl_hours: i64,
    /// TTL for entries that recorded an oracle failure.
    pub error_ttl_hours: i64,
    pub search_results: usize,
    pub evidence_items: usize,
    pub max_range_days: i64,
    pub search_country: String,
    pub search_language: String,
    pub judge_model: String,
    pub judge_temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            requests_per_minute: 15,
            ttl_hours: 24,
            error_ttl_hours: 1,
            search_results: 5,
            evidence_items: 3,
            max_range_days: 7,
            search_country: "it".to_string(),
            search_language: "it".to_string(),
            judge_model: "gemini-2.5-flash-lite".to_string(),
            judge_temperature: 0.2,
            request_timeout_secs: 30,
        }
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
