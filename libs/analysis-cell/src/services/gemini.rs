//! Google Gemini client for schema-constrained JSON generation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;

use crate::error::{AnalysisError, GenerationError};

const ERROR_BODY_LIMIT: usize = 200;

/// Black-box "given a prompt and a schema, return a best-effort object"
/// capability. Output is untrusted and must be re-validated by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<Value, GenerationError>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// -- Response types --

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        if api_key.trim().is_empty() {
            return Err(AnalysisError::Configuration(
                "GEMINI_API_KEY is not configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        Self::new(
            &config.gemini_api_key,
            &config.gemini_model,
            &config.gemini_base_url,
            Duration::from_secs(config.gemini_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub fn build_request_body(prompt: &str, schema: &Value) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
                "temperature": 0.2
            }
        })
    }

    pub fn extract_text(response: &GeminiResponse) -> Option<&str> {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|p| p.text.as_deref()))
            .filter(|text| !text.trim().is_empty())
    }
}

/// Models occasionally wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<Value, GenerationError> {
        let body = Self::build_request_body(prompt, schema);

        info!("Gemini analysis request: model={} prompt={} chars", self.model, prompt.len());

        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| GenerationError::Unavailable(format!("Invalid API key header: {}", e)))?;

        let response = self
            .client
            .post(self.endpoint())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // Truncate error body to avoid leaking sensitive data
            let truncated: String = error_body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: truncated,
            });
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let text = Self::extract_text(&gemini_response).ok_or(GenerationError::EmptyResponse)?;

        debug!("Gemini returned {} chars of structured output", text.len());
        Ok(serde_json::from_str(strip_code_fence(text))?)
    }
}
