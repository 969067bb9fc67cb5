use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// JsonCompletion Trait
// =============================================================================

/// A model that answers a prompt with a single JSON document.
///
/// Implementations return the raw text; callers own the schema and parse it.
#[async_trait]
pub trait JsonCompletion: Send + Sync {
    async fn complete_json(&self, system: &str, user: &str) -> Result<String>;
}
