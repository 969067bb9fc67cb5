use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::error::ConfigError;

/// Paths and secrets loaded from environment variables.
/// Tunables live in the TOML [`FileConfig`](crate::FileConfig).
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the `Eventi_*` partitions.
    pub data_dir: PathBuf,
    /// Directory holding the `Locali_{city}.csv` tables. Defaults to `data_dir`.
    pub venues_dir: PathBuf,
    /// Verification cache documents.
    pub cache_dir: PathBuf,
    /// Optional TOML file with engine tunables.
    pub config_path: Option<PathBuf>,

    // Oracle providers
    pub serper_api_key: String,
    pub gemini_api_key: String,
    pub gemini_base_url: Option<String>,
}

impl Config {
    /// Load the data-only configuration (no oracle keys needed).
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        let venues_dir = env::var("LOCALI_CSV_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.clone());
        let cache_dir = env::var("VERIFY_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("cache").join("verify"));

        Self {
            data_dir,
            venues_dir,
            cache_dir,
            config_path: env::var("VENUESIGNAL_CONFIG").ok().map(PathBuf::from),
            serper_api_key: String::new(),
            gemini_api_key: String::new(),
            gemini_base_url: env::var("GEMINI_BASE_URL").ok(),
        }
    }

    /// Load the configuration for verification runs, which need both oracle keys.
    pub fn verify_from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            serper_api_key: required_env("SERPER_API_KEY")?,
            gemini_api_key: required_env("GEMINI_API_KEY")?,
            ..Self::from_env()
        })
    }

    /// Log the effective configuration with secrets replaced by their presence.
    pub fn log_redacted(&self) {
        info!(
            data_dir = %self.data_dir.display(),
            venues_dir = %self.venues_dir.display(),
            cache_dir = %self.cache_dir.display(),
            config_path = ?self.config_path,
            serper_api_key = redact(&self.serper_api_key),
            gemini_api_key = redact(&self.gemini_api_key),
            gemini_base_url = ?self.gemini_base_url,
            "Configuration loaded"
        );
    }
}

fn required_env(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnv(key)),
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
