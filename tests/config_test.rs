// ABOUTME: Tests for environment-driven configuration loading
// ABOUTME: Required encryption key, overrides, numeric parsing, and LLM selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use base64::{engine::general_purpose, Engine as _};
use outreach_core::errors::ErrorCode;
use outreach_intel::config::{LlmConfig, LlmProviderType, OutreachConfig};
use serial_test::serial;

const MANAGED_VARS: &[&str] = &[
    "OUTREACH_ENCRYPTION_KEY",
    "DATABASE_URL",
    "CRM_API_BASE_URL",
    "CRM_CLIENT_ID",
    "CRM_CLIENT_SECRET",
    "UK_CHARITY_API_KEY",
    "WEBSITE_MAX_CHARS",
    "WEBSITE_MAX_BYTES",
    "HTTP_TIMEOUT_SECS",
    "OUTREACH_LLM_PROVIDER",
    "OUTREACH_LLM_MODEL",
    "OUTREACH_LLM_BASE_URL",
    "GROQ_API_KEY",
];

fn clear_env() {
    for key in MANAGED_VARS {
        env::remove_var(key);
    }
}

fn set_valid_key() {
    env::set_var(
        "OUTREACH_ENCRYPTION_KEY",
        general_purpose::STANDARD.encode([9u8; 32]),
    );
}

#[test]
#[serial]
fn test_missing_encryption_key_is_config_error() {
    clear_env();

    let error = OutreachConfig::from_env().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigMissing);
    assert!(error.message.contains("OUTREACH_ENCRYPTION_KEY"));
}

#[test]
#[serial]
fn test_short_encryption_key_is_rejected() {
    clear_env();
    env::set_var(
        "OUTREACH_ENCRYPTION_KEY",
        general_purpose::STANDARD.encode([9u8; 16]),
    );

    let error = OutreachConfig::from_env().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    clear_env();
}

#[test]
#[serial]
fn test_defaults_and_overrides() {
    clear_env();
    set_valid_key();
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("CRM_API_BASE_URL", "http://localhost:9999");
    env::set_var("WEBSITE_MAX_CHARS", "5000");
    env::set_var("WEBSITE_MAX_BYTES", "65536");

    let config = OutreachConfig::from_env().unwrap();

    assert_eq!(config.database.encryption_key, [9u8; 32]);
    assert_eq!(config.database.url, "sqlite::memory:");
    assert_eq!(config.crm.api_base_url, "http://localhost:9999");
    assert_eq!(config.extraction.max_chars, 5000);
    assert_eq!(config.extraction.max_bytes, 65_536);
    assert!(config.registry.uk_api_key.is_none());
    assert!(config.crm.client_credentials().is_err());
    assert!(!config.summary().contains("OUTREACH_ENCRYPTION_KEY"));
    clear_env();
}

#[test]
#[serial]
fn test_invalid_number_is_config_error() {
    clear_env();
    set_valid_key();
    env::set_var("HTTP_TIMEOUT_SECS", "soon");

    let error = OutreachConfig::from_env().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("HTTP_TIMEOUT_SECS"));
    clear_env();
}

#[test]
#[serial]
fn test_client_credentials_present() {
    clear_env();
    set_valid_key();
    env::set_var("CRM_CLIENT_ID", "client-abc");
    env::set_var("CRM_CLIENT_SECRET", "secret-xyz");

    let config = OutreachConfig::from_env().unwrap();
    let (client_id, client_secret) = config.crm.client_credentials().unwrap();
    assert_eq!(client_id, "client-abc");
    assert_eq!(client_secret, "secret-xyz");
    assert!(!format!("{:?}", config.crm).contains("secret-xyz"));
    clear_env();
}

#[test]
#[serial]
fn test_llm_selection_from_env() {
    clear_env();
    env::set_var("OUTREACH_LLM_PROVIDER", "groq");
    env::set_var("OUTREACH_LLM_MODEL", "llama-3.1-8b-instant");
    env::set_var("GROQ_API_KEY", "groq-key");

    let config = LlmConfig::from_env();
    assert_eq!(config.provider, LlmProviderType::Groq);
    assert_eq!(config.model.as_deref(), Some("llama-3.1-8b-instant"));
    assert_eq!(config.api_key.as_deref(), Some("groq-key"));
    assert!(!format!("{config:?}").contains("groq-key"));

    env::set_var("OUTREACH_LLM_PROVIDER", "something-else");
    assert_eq!(LlmConfig::from_env().provider, LlmProviderType::Gemini);
    clear_env();
}
