use std::time::Duration;

use ai_client::{truncate_to_char_boundary, Gemini, JsonCompletion};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use venuesignal_common::VerificationConfig;

use crate::key::VerificationRequest;
use crate::oracle::{EventJudge, SearchHit, Verdict};

/// Longest snippet passed to the model per search hit.
const MAX_SNIPPET_BYTES: usize = 600;

/// Turns search evidence into a [`Verdict`] by asking an LLM for a strict
/// JSON answer.
pub struct LlmJudge<C> {
    model: C,
}

impl LlmJudge<Gemini> {
    pub fn gemini(api_key: &str, base_url: Option<&str>, config: &VerificationConfig) -> Self {
        let mut model = Gemini::new(api_key, &config.judge_model)
            .with_temperature(config.judge_temperature)
            .with_timeout(Duration::from_secs(config.request_timeout_secs));
        if let Some(url) = base_url {
            model = model.with_base_url(url);
        }
        Self::new(model)
    }
}

impl<C: JsonCompletion> LlmJudge<C> {
    pub fn new(model: C) -> Self {
        Self { model }
    }
}

fn system_prompt(request: &VerificationRequest) -> String {
    format!(
        "Sei un verificatore di eventi. Stabilisci se il locale \"{venue}\" di {locality} \
ospita un evento esattamente il giorno {date}.\n\
\n\
Regole:\n\
- \"exists\" è true solo se almeno una fonte conferma in modo esplicito data, città e locale.\n\
- Se anche uno solo dei tre non coincide (un locale con nome simile, una città vicina, un'altra data), \"exists\" è false.\n\
- Usa solo le fonti elencate, preferendo siti ufficiali e profili social del locale. Non fare supposizioni.\n\
- \"evidence\" contiene solo gli URL delle fonti che confermano l'evento.\n\
\n\
Rispondi solo con JSON: {{\"exists\": true|false, \"confidence\": 0..1, \"evidence\": [\"url\", ...]}}",
        venue = request.venue.trim(),
        locality = request.locality.trim(),
        date = request.date.trim(),
    )
}

fn user_prompt(request: &VerificationRequest, evidence: &[SearchHit]) -> String {
    let mut prompt = format!("Query: {}\nRisultati:\n", request.query());
    for hit in evidence {
        prompt.push_str(&format!(
            "- {}\n  {}\n  {}\n",
            hit.title.trim(),
            truncate_to_char_boundary(hit.snippet.trim(), MAX_SNIPPET_BYTES),
            hit.url.trim()
        ));
    }
    prompt
}

#[derive(Debug, Deserialize)]
struct JudgeResponse {
    exists: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    evidence: Vec<String>,
}

fn parse_verdict(text: &str) -> Result<Verdict> {
    let response: JudgeResponse = serde_json::from_str(text).with_context(|| {
        format!(
            "Malformed judge response: {}",
            truncate_to_char_boundary(text, 200)
        )
    })?;
    let confidence = if response.confidence.is_finite() {
        response.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    Ok(Verdict {
        exists: response.exists,
        confidence,
        evidence: response
            .evidence
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect(),
    })
}

#[async_trait]
impl<C: JsonCompletion> EventJudge for LlmJudge<C> {
    async fn judge(&self, evidence: &[SearchHit], request: &VerificationRequest) -> Result<Verdict> {
        debug!(venue = request.venue.as_str(), hits = evidence.len(), "Judging evidence");

        let text = self
            .model
            .complete_json(&system_prompt(request), &user_prompt(request, evidence))
            .await
            .context("Judge request failed")?;
        let verdict = parse_verdict(&text)?;

        info!(
            venue = request.venue.as_str(),
            date = request.date.as_str(),
            exists = verdict.exists,
            confidence = verdict.confidence,
            "Judge verdict"
        );
        Ok(verdict)
    }
}
