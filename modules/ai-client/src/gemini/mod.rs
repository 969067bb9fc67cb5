mod client;
pub(crate) mod types;

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::traits::JsonCompletion;
use crate::util::extract_json;
use client::GeminiClient;
use types::GenerateRequest;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    temperature: Option<f32>,
    timeout: Duration,
    base_url: Option<String>,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            temperature: None,
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn client(&self) -> Result<GeminiClient> {
        let client = GeminiClient::new(&self.api_key, self.timeout)?;
        Ok(match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        })
    }

    // =========================================================================
    // Convenience methods
    // =========================================================================

    /// Ask for a JSON-only answer and return the JSON payload of its reply.
    pub async fn generate_json(&self, system: &str, user: &str) -> Result<String> {
        let mut request = GenerateRequest::new().system(system).user(user).json_response();
        if let Some(t) = self.temperature {
            request = request.temperature(t);
        }

        let response = self.client()?.generate(&self.model, &request).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        let text = response.text().ok_or_else(|| {
            anyhow!(
                "No text in Gemini response (finish reason: {})",
                response.finish_reason().unwrap_or("unknown")
            )
        })?;
        Ok(extract_json(text).to_string())
    }
}

#[async_trait]
impl JsonCompletion for Gemini {
    async fn complete_json(&self, system: &str, user: &str) -> Result<String> {
        self.generate_json(system, user).await
    }
}
