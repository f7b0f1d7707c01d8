use crate::error::{truncate, AppError, Result, Upstream};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;

/// Sampling parameters for one generation call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub config: GenerationConfig,
}

/// First candidate of a generation reply
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Generation {
    pub finish_reason: Option<String>,
    pub text: Option<String>,
}

impl Generation {
    pub const STOP: &'static str = "STOP";

    pub fn stopped_normally(&self) -> bool {
        self.finish_reason
            .as_deref()
            .map_or(true, |reason| reason == Self::STOP)
    }
}

/// Language-generation seam used by the extractor.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseCandidate {
    finish_reason: Option<String>,
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
    limiter: DefaultDirectRateLimiter,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        requests_per_minute: u32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let per_minute = NonZeroU32::new(requests_per_minute)
            .ok_or_else(|| anyhow::anyhow!("requests_per_minute must be greater than zero"))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists the models visible to the configured key
    pub async fn list_models(&self) -> Result<Value> {
        let url = format!("{}/v1beta/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", &self.api_key)])
            .send()
            .await
            .map_err(|e| AppError::upstream(Upstream::Generation, format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::upstream(Upstream::Generation, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::from_status(Upstream::Generation, status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::upstream(Upstream::Generation, format!("Failed to parse model list: {}", e)))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation> {
        if self.limiter.check().is_err() {
            return Err(AppError::QuotaExceeded(Upstream::Generation));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: &request.config,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream(Upstream::Generation, format!("Request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::upstream(Upstream::Generation, format!("Failed to read response: {}", e)))?;

        tracing::debug!("Gemini HTTP status: {}", status);

        if !status.is_success() {
            tracing::error!("Gemini API error: {} - {}", status, truncate(&response_text, 500));
            return Err(AppError::from_status(Upstream::Generation, status, &response_text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text).map_err(|e| {
            AppError::upstream(
                Upstream::Generation,
                format!("Failed to parse Gemini response: {}", e),
            )
        })?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ExtractionIncomplete("no candidates returned".to_string()))?;

        let text = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text);

        Ok(Generation {
            finish_reason: candidate.finish_reason,
            text,
        })
    }
}
