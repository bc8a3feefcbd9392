// src/clients/ai.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::services::generation::{GenerationRequest, build_prompt};

/// Failure kinds of the generation call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("request timed out")]
    Timeout,
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("authentication failed")]
    Authentication,
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("empty response")]
    EmptyResponse,
    #[error("malformed JSON: {0}")]
    MalformedJson(String),
    #[error("response blocked: {0}")]
    Blocked(String),
}

/// A generative model that turns a document into quiz JSON.
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Returns the model's raw text answer, expected to be a JSON object.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AiError>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            timeout,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: InlineData<'a> },
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Http(e.to_string()))?;

        info!(model = %config.model, timeout_secs = config.timeout.as_secs(), "Creating new Gemini client");
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl QuizGenerator for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.config.model, question_count = request.question_count))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AiError> {
        let (mime_type, data) = request
            .inline_data()
            .ok_or_else(|| AiError::Http("request carries no inline document".to_string()))?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData { mime_type, data },
                    },
                    Part::Text {
                        text: build_prompt(request),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.4,
            },
        };

        debug!(payload_len = data.len(), "Sending request to Gemini API");
        let started = std::time::Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Gemini request timed out");
                    AiError::Timeout
                } else {
                    error!(error = %e, "HTTP request failed");
                    AiError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        debug!(%status, elapsed_ms = started.elapsed().as_millis() as u64, "Received response from Gemini API");

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Gemini API rate limit exceeded");
            return Err(AiError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!("Gemini API authentication failed");
            return Err(AiError::Authentication);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(%status, %message, "Gemini API returned an error");
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AiError::Timeout
            } else {
                AiError::Http(format!("invalid response body: {}", e))
            }
        })?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            warn!(%reason, "Gemini returned no candidate");
            return Err(AiError::Blocked(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            warn!(finish_reason = ?candidate.finish_reason, "Gemini returned an empty answer");
            return Err(AiError::EmptyResponse);
        }

        info!(response_len = text.len(), "Gemini generation completed");
        Ok(text)
    }
}
