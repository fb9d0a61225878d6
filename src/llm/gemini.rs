// ABOUTME: Google Gemini LLM provider implementation
// ABOUTME: Single-turn generateContent calls with optional JSON response mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini Provider
//!
//! [`LlmProvider`] over the Generative Language API `generateContent` method.
//! System messages become the request's `systemInstruction`; JSON mode sets
//! `responseMimeType` so the answer is a bare JSON document.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use outreach_core::errors::{AppError, ErrorCode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, MessageRole, TokenUsage};
use crate::utils::http_client::llm_client;

const SERVICE: &str = "Gemini";

const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_owned),
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    candidate_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl From<&ChatRequest> for GenerateContentRequest {
    fn from(request: &ChatRequest) -> Self {
        let mut instructions = Vec::new();
        let mut contents = Vec::new();

        for message in &request.messages {
            match message.role {
                MessageRole::System => instructions.push(message.content.as_str()),
                MessageRole::User => {
                    contents.push(Content::text(Some("user"), message.content.clone()));
                }
                MessageRole::Assistant => {
                    contents.push(Content::text(Some("model"), message.content.clone()));
                }
            }
        }

        Self {
            contents,
            system_instruction: (!instructions.is_empty())
                .then(|| Content::text(None, instructions.join("\n\n"))),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                candidate_count: 1,
                response_mime_type: request.json_output.then_some("application/json"),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl From<&UsageMetadata> for TokenUsage {
    fn from(metadata: &UsageMetadata) -> Self {
        Self {
            prompt_tokens: metadata.prompt_token_count,
            completion_tokens: metadata.candidates_token_count,
            total_tokens: metadata.total_token_count,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

impl GenerateContentResponse {
    /// Joined text of the first candidate
    fn into_text(self) -> Result<(String, Option<String>), AppError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE, "response has no candidates"))?;
        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(AppError::external_service(
                SERVICE,
                format!(
                    "candidate has no text (finish reason {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }
        Ok((text, candidate.finish_reason))
    }
}

/// Google Gemini LLM provider
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: Client,
    default_model: String,
}

impl GeminiProvider {
    /// Create a provider for the public API
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: API_BASE_URL.to_owned(),
            client: llm_client(),
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Set a custom default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Point the provider at a different API root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Classify a non-2xx answer
    fn status_error(status: u16, body: &str) -> AppError {
        let message = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
            |_| body.chars().take(200).collect(),
            |envelope| envelope.error.message,
        );

        match status {
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("{SERVICE} quota exceeded: {message}"),
            ),
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{SERVICE} rejected the API key: {message}"),
            ),
            500..=599 => AppError::external_unavailable(SERVICE, format!("({status}) {message}")),
            _ => AppError::external_service(SERVICE, format!("API error ({status}): {message}")),
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::structured()
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip_all, fields(provider = "gemini"))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let url = format!("{}/models/{model}:generateContent", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::from(request))
            .send()
            .await
            .map_err(|e| {
                AppError::external_unavailable(SERVICE, format!("request failed: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                AppError::external_service(SERVICE, format!("unreadable response: {e}"))
            })?;

        if !status.is_success() {
            error!(status = %status, "Gemini rejected the request");
            return Err(Self::status_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::external_service(SERVICE, format!("unexpected response shape: {e}"))
        })?;
        if let Some(api_error) = parsed.error {
            return Err(AppError::external_service(SERVICE, api_error.message));
        }

        let usage = parsed.usage_metadata.as_ref().map(TokenUsage::from);
        let (content, finish_reason) = parsed.into_text()?;
        debug!(chars = content.len(), "Gemini answered");

        Ok(ChatResponse {
            content,
            model: model.to_owned(),
            usage,
            finish_reason,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                AppError::external_unavailable(SERVICE, format!("health check failed: {e}"))
            })?;

        Ok(response.status().is_success())
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("default_model", &self.default_model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[test]
    fn test_system_messages_become_instruction() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("be brief"),
            ChatMessage::system("answer in JSON"),
            ChatMessage::user("hello"),
        ])
        .with_json_output();
        let json =
            serde_json::to_value(GenerateContentRequest::from(&request)).expect("serialize");

        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "be brief\n\nanswer in JSON"
        );
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_status_error_codes() {
        let limited =
            GeminiProvider::status_error(429, r#"{"error":{"message":"Resource exhausted"}}"#);
        assert_eq!(limited.code, ErrorCode::ExternalRateLimited);
        assert!(limited.message.contains("Resource exhausted"));

        let auth = GeminiProvider::status_error(403, "forbidden");
        assert_eq!(auth.code, ErrorCode::ExternalAuthFailed);

        let down = GeminiProvider::status_error(503, "");
        assert_eq!(down.code, ErrorCode::ExternalServiceUnavailable);
    }

    #[test]
    fn test_candidate_text_joined() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]},"finishReason":"STOP"}]}"#,
        )
        .expect("response");
        let (text, finish) = response.into_text().expect("text");
        assert_eq!(text, r#"{"a":1}"#);
        assert_eq!(finish.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GeminiProvider::new("super-secret");
        assert!(!format!("{provider:?}").contains("super-secret"));
    }
}
