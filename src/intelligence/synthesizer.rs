// ABOUTME: Report synthesizer invoking the LLM once per outreach report
// ABOUTME: Builds the prompt, calls the provider, and validates the structured answer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Instant;

use outreach_core::constants::generation::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use outreach_core::errors::{OutreachError, OutreachResult};
use outreach_core::models::{FinancialSnapshot, RegistryCountry, ReportContent};
use tracing::{debug, warn};

use super::parser::{parse_generation, GenerationParse};
use super::prompts::{build_user_prompt, system_prompt};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider, TokenUsage};

/// Aggregated research inputs for one report
#[derive(Debug, Clone, Default)]
pub struct SynthesisInput {
    /// Organization display name, when known
    pub organization_name: Option<String>,
    /// Organization website
    pub website_url: String,
    /// Extracted website text
    pub website_text: String,
    /// Page with more specific context
    pub specific_url: Option<String>,
    /// Extracted text of `specific_url`
    pub specific_page_text: Option<String>,
    /// Registry filings, latest first
    pub financials: Option<Vec<FinancialSnapshot>>,
    /// Registry the filings came from
    pub country: Option<RegistryCountry>,
    /// Free-text note from the sender
    pub insight: Option<String>,
}

/// Validated generation result
#[derive(Debug, Clone)]
pub struct SynthesizedReport {
    /// Parsed report content, placeholders still literal
    pub content: ReportContent,
    /// Model that produced it
    pub model: String,
    /// Token usage, if the provider reported it
    pub usage: Option<TokenUsage>,
}

/// Turns research inputs into structured report content
#[derive(Clone)]
pub struct ReportSynthesizer {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl ReportSynthesizer {
    /// Create a synthesizer using the provider's default model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Override the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Provider identifier
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Generate and validate one report
    ///
    /// # Errors
    ///
    /// - `GenerationFailed` when the provider call fails
    /// - `MalformedGenerationOutput` when the answer lacks the report shape
    pub async fn synthesize(&self, input: &SynthesisInput) -> OutreachResult<SynthesizedReport> {
        let request = self.build_request(input);
        let started = Instant::now();

        let response = self.provider.complete(&request).await.map_err(|source| {
            OutreachError::GenerationFailed {
                provider: self.provider.name().to_owned(),
                source,
            }
        })?;

        debug!(
            provider = self.provider.name(),
            model = %response.model,
            duration_ms = started.elapsed().as_millis(),
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "Generation completed"
        );

        match parse_generation(&response.content) {
            GenerationParse::Parsed(content) => Ok(SynthesizedReport {
                content,
                model: response.model,
                usage: response.usage,
            }),
            GenerationParse::Malformed { raw, reason } => {
                warn!(
                    provider = self.provider.name(),
                    model = %response.model,
                    reason = %reason,
                    raw = %raw,
                    "Discarding malformed generation output"
                );
                Err(OutreachError::MalformedGenerationOutput { reason, raw })
            }
        }
    }

    fn build_request(&self, input: &SynthesisInput) -> ChatRequest {
        let user_prompt = build_user_prompt(input);
        let capabilities = self.provider.capabilities();

        let messages = if capabilities.supports_system_messages() {
            vec![ChatMessage::system(system_prompt()), ChatMessage::user(user_prompt)]
        } else {
            vec![ChatMessage::user(format!("{}\n\n{user_prompt}", system_prompt()))]
        };

        let mut request = ChatRequest::new(messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        if capabilities.supports_json_mode() {
            request = request.with_json_output();
        }
        request
    }
}
