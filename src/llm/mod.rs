// ABOUTME: LLM provider abstraction used for outreach report generation
// ABOUTME: Message, request, and response types plus the provider contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Provider Interface
//!
//! Report synthesis needs exactly one single-turn completion per report, so the
//! contract here is a plain request/response call. Providers:
//!
//! - [`GeminiProvider`]: Google Generative Language API
//! - [`OpenAiCompatibleProvider`]: `OpenAI`, Groq, or a local `OpenAI`-compatible server
//!
//! [`ChatProvider`] picks one from configuration.
//!
//! ## Example
//!
//! ```rust,no_run
//! use outreach_intel::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::system("You write outreach emails."),
//!         ChatMessage::user("Draft an introduction."),
//!     ])
//!     .with_json_output();
//!     let response = provider.complete(&request).await;
//! }
//! ```

mod gemini;
mod openai_compatible;
mod provider;

pub use gemini::GeminiProvider;
pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use provider::ChatProvider;

use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use outreach_core::errors::AppError;

bitflags::bitflags! {
    /// What a provider can do beyond plain text completion
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct LlmCapabilities: u8 {
        /// Separate system instruction
        const SYSTEM_MESSAGES = 1;
        /// Answer constrained to a JSON document
        const JSON_MODE = 1 << 1;
    }
}

impl LlmCapabilities {
    /// Instruction-following provider without a JSON mode
    #[must_use]
    pub const fn text_only() -> Self {
        Self::SYSTEM_MESSAGES
    }

    /// Provider that can be held to a JSON answer
    #[must_use]
    pub const fn structured() -> Self {
        Self::SYSTEM_MESSAGES.union(Self::JSON_MODE)
    }

    /// Whether `json_output` requests are honored natively
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }

    /// Whether a system message can be sent as-is
    #[must_use]
    pub const fn supports_system_messages(&self) -> bool {
        self.contains(Self::SYSTEM_MESSAGES)
    }
}

/// Author of a prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// Standing instructions
    System,
    /// Prompt content
    User,
    /// Prior model output
    Assistant,
}

impl MessageRole {
    /// Wire name used by chat-completions APIs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl Display for MessageRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One prompt message
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Author
    pub role: MessageRole,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Message with an explicit role
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Standing instruction message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Prompt message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// A single-turn completion call
///
/// Unset options fall back to the provider defaults.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Prompt, in order
    pub messages: Vec<ChatMessage>,
    /// Overrides the provider's default model
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Completion length cap
    pub max_tokens: Option<u32>,
    /// Ask for a bare JSON document; ignored by providers without JSON mode
    pub json_output: bool,
}

impl ChatRequest {
    /// Request with provider defaults
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            json_output: false,
        }
    }

    /// Use a specific model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the completion length
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for a JSON document
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Completion result
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text
    pub content: String,
    /// Model that actually answered
    pub model: String,
    /// Token accounting, when reported
    pub usage: Option<TokenUsage>,
    /// Provider stop reason, verbatim
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    /// Prompt side
    pub prompt_tokens: u32,
    /// Completion side
    pub completion_tokens: u32,
    /// Both
    pub total_tokens: u32,
}

/// Text generation backend used by the report synthesizer
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short identifier recorded in errors and logs
    fn name(&self) -> &'static str;

    /// Name shown to operators
    fn display_name(&self) -> &'static str;

    /// Supported request features
    fn capabilities(&self) -> LlmCapabilities;

    /// Model used when the request does not name one
    fn default_model(&self) -> &str;

    /// Run one completion
    ///
    /// # Errors
    ///
    /// Returns an error when the provider is unreachable, rejects the request,
    /// or answers with nothing usable
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;

    /// Check reachability and key validity
    ///
    /// # Errors
    ///
    /// Returns an error when the provider cannot be reached at all
    async fn health_check(&self) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_model("m")
            .with_temperature(0.2)
            .with_max_tokens(64)
            .with_json_output();

        assert_eq!(request.model.as_deref(), Some("m"));
        assert_eq!(request.max_tokens, Some(64));
        assert!(request.json_output);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(MessageRole::System.to_string(), "system");
        assert_eq!(MessageRole::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_capabilities() {
        assert!(LlmCapabilities::structured().supports_json_mode());
        assert!(!LlmCapabilities::text_only().supports_json_mode());
        assert!(LlmCapabilities::text_only().supports_system_messages());
    }
}
