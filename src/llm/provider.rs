// ABOUTME: Unified LLM provider selector for runtime provider switching
// ABOUTME: Builds Gemini, OpenAI, Groq, or local providers from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Provider Selector
//!
//! Set `OUTREACH_LLM_PROVIDER` to `gemini` (default), `openai`, `groq`, or
//! `local`. `OUTREACH_LLM_MODEL` and `OUTREACH_LLM_BASE_URL` override the
//! provider defaults.

use std::fmt;

use async_trait::async_trait;
use outreach_core::errors::AppError;
use tracing::info;

use super::{
    ChatRequest, ChatResponse, GeminiProvider, LlmCapabilities, LlmProvider,
    OpenAiCompatibleConfig, OpenAiCompatibleProvider,
};
use crate::config::{LlmConfig, LlmProviderType};

/// Unified chat provider wrapping the configured backend
pub enum ChatProvider {
    /// Google Gemini
    Gemini(GeminiProvider),
    /// `OpenAI`, Groq, or a local server
    OpenAiCompatible(OpenAiCompatibleProvider),
}

impl ChatProvider {
    /// Create a provider from environment configuration
    ///
    /// # Errors
    ///
    /// Returns a config error if the selected provider needs an API key that is not set
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_config(&LlmConfig::from_env())
    }

    /// Create a provider from explicit settings
    ///
    /// # Errors
    ///
    /// Returns a config error if the selected provider needs an API key that is not set
    pub fn from_config(config: &LlmConfig) -> Result<Self, AppError> {
        let provider = match config.provider {
            LlmProviderType::Gemini => {
                let mut provider = GeminiProvider::new(Self::require_key(config)?);
                if let Some(base_url) = &config.base_url {
                    provider = provider.with_base_url(base_url.clone());
                }
                if let Some(model) = &config.model {
                    provider = provider.with_default_model(model.clone());
                }
                Self::Gemini(provider)
            }
            LlmProviderType::OpenAi => Self::openai_compatible(
                OpenAiCompatibleConfig::openai(Self::require_key(config)?),
                config,
            ),
            LlmProviderType::Groq => Self::openai_compatible(
                OpenAiCompatibleConfig::groq(Self::require_key(config)?),
                config,
            ),
            LlmProviderType::Local => {
                let mut preset = OpenAiCompatibleConfig::local();
                preset.api_key = config.api_key.clone().filter(|k| !k.is_empty());
                Self::openai_compatible(preset, config)
            }
        };

        info!(
            provider = provider.name(),
            model = provider.default_model(),
            "LLM provider initialized (set {} to change)",
            LlmProviderType::ENV_VAR
        );
        Ok(provider)
    }

    fn require_key(config: &LlmConfig) -> Result<String, AppError> {
        config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::config(format!(
                    "{} environment variable not set",
                    config.provider.api_key_env_var()
                ))
            })
    }

    fn openai_compatible(mut preset: OpenAiCompatibleConfig, config: &LlmConfig) -> Self {
        if let Some(base_url) = &config.base_url {
            preset = preset.with_base_url(base_url.clone());
        }
        if let Some(model) = &config.model {
            preset = preset.with_default_model(model.clone());
        }
        Self::OpenAiCompatible(OpenAiCompatibleProvider::new(preset))
    }

    fn inner(&self) -> &dyn LlmProvider {
        match self {
            Self::Gemini(provider) => provider,
            Self::OpenAiCompatible(provider) => provider,
        }
    }
}

#[async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn display_name(&self) -> &'static str {
        self.inner().display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.inner().capabilities()
    }

    fn default_model(&self) -> &str {
        self.inner().default_model()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.inner().complete(request).await
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        self.inner().health_check().await
    }
}

impl fmt::Debug for ChatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatProvider")
            .field("provider", &self.name())
            .field("model", &self.default_model())
            .finish()
    }
}
