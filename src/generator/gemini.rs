use super::{build_prompt, GeneratedReadme, GenerationInput, ReadmeGenerator};
use crate::config::GeminiConfig;
use crate::error::GenerationError;
use crate::retry::{with_retries, RetryPolicy};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const MAX_RETRIES: u32 = 3;
const INITIAL_RETRY_DELAY: u64 = 1000; // milliseconds
const MAX_RETRY_DELAY: u64 = 10000; // 10 seconds max delay

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
    retry: RetryPolicy,
}

impl GeminiGenerator {
    pub fn new(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerationError::ValidationError("Gemini API key not configured".to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            api_url: config
                .api_url
                .clone()
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            retry: RetryPolicy::exponential(
                MAX_RETRIES,
                Duration::from_millis(INITIAL_RETRY_DELAY),
                Duration::from_millis(MAX_RETRY_DELAY),
            ),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn request(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| GenerationError::ValidationError(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .json(&json!({
                "contents": [
                    {
                        "role": "user",
                        "parts": [{ "text": prompt }]
                    }
                ]
            }))
            .send()
            .await
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        match response.status() {
            StatusCode::OK => (),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(GenerationError::RateLimitError("Rate limit exceeded".to_string()));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(GenerationError::AuthenticationError("Invalid API key".to_string()));
            }
            status => {
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                return Err(GenerationError::APIError(format!(
                    "Unexpected status code: {} - Response: {}",
                    status, error_body
                )));
            }
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| GenerationError::NetworkError(format!("Failed to read response body: {}", e)))?;
        debug!(bytes = response_text.len(), "Received generation response");

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            GenerationError::ParseError(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::ParseError("Empty response from Gemini".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl ReadmeGenerator for GeminiGenerator {
    async fn generate(&self, input: &GenerationInput<'_>) -> Result<GeneratedReadme, GenerationError> {
        let prompt = build_prompt(input);
        debug!(project = input.name(), chars = prompt.len(), "Requesting README");

        let text = with_retries(&self.retry, GenerationError::is_retryable, || self.request(&prompt)).await?;
        Ok(GeneratedReadme::from_content(text))
    }
}
