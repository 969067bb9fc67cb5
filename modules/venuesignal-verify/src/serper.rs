use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use venuesignal_common::VerificationConfig;

use crate::oracle::{EventSearcher, SearchHit};

const SERPER_URL: &str = "https://google.serper.dev/search";

// --- Serper (Google Search) ---

pub struct SerperSearcher {
    api_key: String,
    client: reqwest::Client,
    num: usize,
    country: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

impl SerperSearcher {
    pub fn new(api_key: &str, config: &VerificationConfig) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .context("Failed to build HTTP client")?,
            num: config.search_results,
            country: config.search_country.clone(),
            language: config.search_language.clone(),
        })
    }

    fn body(&self, query: &str) -> serde_json::Value {
        serde_json::json!({
            "q": query,
            "num": self.num,
            "gl": self.country,
            "hl": self.language,
        })
    }
}

fn parse_hits(body: &[u8]) -> Result<Vec<SearchHit>> {
    let data: SerperResponse =
        serde_json::from_slice(body).context("Failed to parse Serper response")?;
    Ok(data
        .organic
        .into_iter()
        .map(|r| SearchHit {
            url: r.link,
            title: r.title,
            snippet: r.snippet,
        })
        .collect())
}

#[async_trait]
impl EventSearcher for SerperSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        info!(query, num = self.num, "Serper search");

        let resp = self
            .client
            .post(SERPER_URL)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&self.body(query))
            .send()
            .await
            .context("Serper API request failed")?
            .error_for_status()
            .context("Serper API returned an error status")?;

        let bytes = resp.bytes().await.context("Failed to read Serper response")?;
        let results = parse_hits(&bytes)?;

        info!(query, count = results.len(), "Serper search complete");
        Ok(results)
    }
}
