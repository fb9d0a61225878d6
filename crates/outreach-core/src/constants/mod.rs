// ABOUTME: Constants module with domain-separated organization
// ABOUTME: CRM, registry, extraction, and generation defaults for the outreach pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Defaults here are overridable through environment configuration.

/// CRM platform endpoints and headers
pub mod crm;
/// Nonprofit registry endpoints
pub mod registry;

/// Website extraction limits
pub mod extraction {
    /// Maximum characters of extracted text passed to the prompt
    pub const DEFAULT_MAX_CHARS: usize = 15_000;
    /// Maximum bytes of a fetched page read before extraction
    pub const DEFAULT_MAX_BYTES: usize = 2 * 1024 * 1024;
    /// User agent sent with website fetches
    pub const USER_AGENT: &str = concat!("outreach-intel/", env!("CARGO_PKG_VERSION"));
}

/// Report generation defaults
pub mod generation {
    /// Sampling temperature for report synthesis
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    /// Output token ceiling for report synthesis
    pub const DEFAULT_MAX_TOKENS: u32 = 4_096;
    /// Financial periods summarized in the prompt
    pub const PROMPT_FINANCIAL_PERIODS: usize = 3;
}

/// Placeholder tokens recognized by the templater
pub mod placeholders {
    /// Recipient first name
    pub const FIRST_NAME: &str = "[First Name]";
    /// Recipient last name
    pub const LAST_NAME: &str = "[Last Name]";
    /// Recipient organization
    pub const ORGANIZATION_NAME: &str = "[Organization Name]";
    /// Alias of the organization token
    pub const COMPANY_NAME: &str = "[Company Name]";
    /// Sender name
    pub const SENDER_NAME: &str = "[Your Name]";
    /// Alias of the sender token
    pub const SENDER_NAME_ALT: &str = "[Sender Name]";
}

/// HTTP timeouts
pub mod timeouts {
    /// Default request timeout for API clients
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout for API clients
    pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// OAuth token exchange timeout
    pub const OAUTH_TIMEOUT_SECS: u64 = 15;
    /// OAuth token exchange connect timeout
    pub const OAUTH_CONNECT_TIMEOUT_SECS: u64 = 5;
    /// AI generation timeout
    pub const LLM_TIMEOUT_SECS: u64 = 120;
}
