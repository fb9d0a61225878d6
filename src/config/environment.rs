// ABOUTME: Environment configuration for the outreach intelligence pipeline
// ABOUTME: Loads database, CRM, registry, HTTP, extraction, and AI settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-only configuration
//!
//! Every setting has a default except secrets. Missing secrets fail at load time
//! only when nothing can run without them (the database encryption key); CRM
//! client credentials are checked when an OAuth client is built.

use std::env;
use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};
use outreach_core::constants::{crm, extraction, registry, timeouts};
use outreach_core::errors::{AppError, AppResult, ErrorCode};
use tracing::{info, warn};

use super::types::{Environment, LlmProviderType};
use crate::utils::http_client::HttpClientConfig;

/// Environment variable holding the database URL
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable holding the base64 token encryption key
pub const ENCRYPTION_KEY_ENV: &str = "OUTREACH_ENCRYPTION_KEY";

/// Default database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/outreach.db";

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct OutreachConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Persistence settings
    pub database: DatabaseConfig,
    /// CRM OAuth and API settings
    pub crm: CrmConfig,
    /// Financial registry settings
    pub registry: RegistryConfig,
    /// Shared HTTP client timeouts
    pub http: HttpClientConfig,
    /// Website extraction limits
    pub extraction: ExtractionConfig,
    /// AI generation backend
    pub llm: LlmConfig,
}

/// Persistence settings
#[derive(Clone)]
pub struct DatabaseConfig {
    /// sqlx connection URL
    pub url: String,
    /// AES-256 key for tokens at rest
    pub encryption_key: [u8; 32],
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("encryption_key", &"[REDACTED]")
            .finish()
    }
}

/// CRM OAuth and API settings
#[derive(Clone)]
pub struct CrmConfig {
    /// OAuth client id
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// Redirect URI registered for the authorization code flow
    pub redirect_uri: Option<String>,
    /// Token endpoint
    pub token_url: String,
    /// Resource API base
    pub api_base_url: String,
    /// Value of the API version header
    pub api_version: String,
}

impl CrmConfig {
    /// Client id and secret, or a config error naming the missing variable
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when either credential is unset
    pub fn client_credentials(&self) -> AppResult<(&str, &str)> {
        let client_id = self.client_id.as_deref().ok_or_else(|| {
            AppError::new(ErrorCode::ConfigMissing, "CRM_CLIENT_ID is not set")
        })?;
        let client_secret = self.client_secret.as_deref().ok_or_else(|| {
            AppError::new(ErrorCode::ConfigMissing, "CRM_CLIENT_SECRET is not set")
        })?;
        Ok((client_id, client_secret))
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            token_url: crm::TOKEN_URL.to_owned(),
            api_base_url: crm::API_BASE_URL.to_owned(),
            api_version: crm::API_VERSION.to_owned(),
        }
    }
}

impl fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Financial registry settings
#[derive(Clone)]
pub struct RegistryConfig {
    /// UK register API base
    pub uk_base_url: String,
    /// UK register subscription key; without it UK lookups are skipped
    pub uk_api_key: Option<String>,
    /// US nonprofit API base
    pub us_base_url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            uk_base_url: registry::UK_API_BASE_URL.to_owned(),
            uk_api_key: None,
            us_base_url: registry::US_API_BASE_URL.to_owned(),
        }
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("uk_base_url", &self.uk_base_url)
            .field("uk_api_key", &self.uk_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("us_base_url", &self.us_base_url)
            .finish()
    }
}

/// Website extraction limits
#[derive(Debug, Clone, Copy)]
pub struct ExtractionConfig {
    /// Maximum characters kept from one page
    pub max_chars: usize,
    /// Maximum bytes downloaded for one page
    pub max_bytes: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_chars: extraction::DEFAULT_MAX_CHARS,
            max_bytes: extraction::DEFAULT_MAX_BYTES,
        }
    }
}

/// AI generation backend settings
#[derive(Clone, Default)]
pub struct LlmConfig {
    /// Backend selection
    pub provider: LlmProviderType,
    /// Model override; provider default when absent
    pub model: Option<String>,
    /// API key for the selected provider
    pub api_key: Option<String>,
    /// Base URL override
    pub base_url: Option<String>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmConfig {
    /// Load AI backend settings from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let provider = env::var(LlmProviderType::ENV_VAR)
            .map(|s| LlmProviderType::from_str_or_default(&s))
            .unwrap_or_default();

        Self {
            provider,
            model: optional_env(LlmProviderType::MODEL_ENV_VAR),
            api_key: optional_env(provider.api_key_env_var()),
            base_url: optional_env(LlmProviderType::BASE_URL_ENV_VAR).or_else(|| {
                optional_env("LOCAL_LLM_BASE_URL").filter(|_| provider == LlmProviderType::Local)
            }),
        }
    }
}

impl OutreachConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error when the encryption key is missing or malformed,
    /// or when a numeric setting cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database: DatabaseConfig {
                url: env_var_or(DATABASE_URL_ENV, DEFAULT_DATABASE_URL),
                encryption_key: decode_encryption_key(&required_env(ENCRYPTION_KEY_ENV)?)?,
            },
            crm: CrmConfig {
                client_id: optional_env("CRM_CLIENT_ID"),
                client_secret: optional_env("CRM_CLIENT_SECRET"),
                redirect_uri: optional_env("CRM_REDIRECT_URI"),
                token_url: env_var_or("CRM_TOKEN_URL", crm::TOKEN_URL),
                api_base_url: env_var_or("CRM_API_BASE_URL", crm::API_BASE_URL),
                api_version: env_var_or("CRM_API_VERSION", crm::API_VERSION),
            },
            registry: RegistryConfig {
                uk_base_url: env_var_or("UK_CHARITY_API_BASE_URL", registry::UK_API_BASE_URL),
                uk_api_key: optional_env("UK_CHARITY_API_KEY"),
                us_base_url: env_var_or("US_NONPROFIT_API_BASE_URL", registry::US_API_BASE_URL),
            },
            http: HttpClientConfig {
                timeout_secs: parse_env("HTTP_TIMEOUT_SECS", timeouts::HTTP_TIMEOUT_SECS)?,
                connect_timeout_secs: parse_env(
                    "HTTP_CONNECT_TIMEOUT_SECS",
                    timeouts::HTTP_CONNECT_TIMEOUT_SECS,
                )?,
            },
            extraction: ExtractionConfig {
                max_chars: parse_env("WEBSITE_MAX_CHARS", extraction::DEFAULT_MAX_CHARS)?,
                max_bytes: parse_env("WEBSITE_MAX_BYTES", extraction::DEFAULT_MAX_BYTES)?,
            },
            llm: LlmConfig::from_env(),
        };

        config.validate();
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Warn about settings that will fail later
    fn validate(&self) {
        if self.crm.client_id.is_none() || self.crm.client_secret.is_none() {
            warn!("CRM_CLIENT_ID or CRM_CLIENT_SECRET not set; token refresh will fail");
        }
        if self.registry.uk_api_key.is_none() {
            warn!("UK_CHARITY_API_KEY not set; UK financial lookups will be skipped");
        }
        if self.llm.provider.requires_api_key() && self.llm.api_key.is_none() {
            warn!(
                "{} not set; report generation will fail",
                self.llm.provider.api_key_env_var()
            );
        }
    }

    /// Configuration summary without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Outreach configuration:\n\
             - Environment: {}\n\
             - Database: {}\n\
             - CRM API: {} (version {})\n\
             - LLM provider: {} (model: {})\n\
             - Website max chars: {}",
            self.environment,
            self.database.url,
            self.crm.api_base_url,
            self.crm.api_version,
            self.llm.provider,
            self.llm.model.as_deref().unwrap_or("provider default"),
            self.extraction.max_chars,
        )
    }
}

/// Decode a base64 AES-256 key
///
/// # Errors
///
/// Returns `ConfigInvalid` unless the value decodes to exactly 32 bytes
pub fn decode_encryption_key(encoded: &str) -> AppResult<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| {
            AppError::new(
                ErrorCode::ConfigInvalid,
                format!("{ENCRYPTION_KEY_ENV} is not valid base64: {e}"),
            )
        })?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        AppError::new(
            ErrorCode::ConfigInvalid,
            format!("{ENCRYPTION_KEY_ENV} must decode to 32 bytes, got {}", bytes.len()),
        )
    })
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required_env(key: &str) -> AppResult<String> {
    optional_env(key).ok_or_else(|| {
        AppError::new(ErrorCode::ConfigMissing, format!("{key} environment variable not set"))
    })
}

fn parse_env<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    optional_env(key).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|_| {
            AppError::new(ErrorCode::ConfigInvalid, format!("Invalid {key} value: {raw}"))
        })
    })
}
