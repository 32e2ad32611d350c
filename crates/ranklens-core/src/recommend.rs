//! Recommendation generation
//!
//! Turns low-scoring rubric factors into prioritized action items by calling
//! an external OpenAI-compatible chat endpoint. The contract is a single
//! attempt with a bounded timeout and graceful degradation: any transport
//! error, non-success status, or unparseable model output is logged and
//! reported as an empty recommendation list, never as an error.
//!
//! Requires the `recommend` feature.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::types::ScoreFactor;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// One prioritized action item produced by the language model.
///
/// Model output is untrusted; every field defaults so a partially-shaped
/// item still deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Rubric factor the action addresses
    #[serde(default)]
    pub factor: String,
    /// 1 = highest
    #[serde(default)]
    pub priority: u32,
    /// Human-readable action text
    #[serde(default)]
    pub action: String,
}

/// Client for one recommendation endpoint.
pub struct RecommendationClient {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl RecommendationClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generate action items for the given low-scoring factors.
    ///
    /// Never fails: degraded calls return an empty list.
    pub async fn generate(&self, low_factors: &[ScoreFactor]) -> Vec<Recommendation> {
        if low_factors.is_empty() {
            return Vec::new();
        }

        match self.request(low_factors).await {
            Ok(recommendations) => recommendations,
            Err(err) => {
                warn!("recommendation call failed, returning empty list: {err:#}");
                Vec::new()
            }
        }
    }

    async fn request(&self, low_factors: &[ScoreFactor]) -> Result<Vec<Recommendation>> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("failed to build recommendation http client")?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an SEO and AI-search optimization assistant. \
                                Respond with a JSON array of objects, each with the keys \
                                \"factor\", \"priority\" (1 = highest), and \"action\". \
                                No prose outside the array."
                },
                {
                    "role": "user",
                    "content": build_prompt(low_factors)
                }
            ]
        });

        let mut request = client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("failed to reach recommendation endpoint")?
            .error_for_status()
            .context("non-success status from recommendation endpoint")?;

        let payload: JsonValue = response
            .json()
            .await
            .context("failed to read recommendation response body")?;

        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(|value| value.as_str())
            .ok_or_else(|| anyhow!("recommendation response missing message content"))?;

        parse_recommendations(content)
    }
}

/// Select the factors worth sending to the model: those awarded at most half
/// of their rubric maximum. `factor_max` resolves a name to its maximum.
pub fn low_scoring_factors(
    factors: &[ScoreFactor],
    factor_max: impl Fn(&str) -> Option<u32>,
) -> Vec<ScoreFactor> {
    factors
        .iter()
        .filter(|factor| {
            factor_max(&factor.name)
                .map(|max| factor.points_awarded * 2 <= max)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

fn build_prompt(low_factors: &[ScoreFactor]) -> String {
    let mut prompt = String::from(
        "These page-quality factors scored poorly. Produce one action item per factor.\n",
    );
    for factor in low_factors {
        prompt.push_str(&format!(
            "- {} ({} pts): {}\n",
            factor.name, factor.points_awarded, factor.explanation
        ));
    }
    prompt
}

/// Parse a JSON array of recommendations out of untrusted model output.
///
/// Tolerates markdown code fences and prose around the array; items that are
/// not objects are skipped rather than failing the whole batch.
fn parse_recommendations(content: &str) -> Result<Vec<Recommendation>> {
    let array_text = extract_json_array(content)
        .ok_or_else(|| anyhow!("no JSON array found in model output"))?;

    let values: Vec<JsonValue> = serde_json::from_str(array_text)
        .context("model output array is not valid JSON")?;

    Ok(values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

/// The outermost `[...]` span of the text, if any.
fn extract_json_array(content: &str) -> Option<&str> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&content[start..=end])
}
