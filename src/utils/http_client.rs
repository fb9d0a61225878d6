// ABOUTME: Shared HTTP client utilities with connection pooling and timeout configuration
// ABOUTME: Separate clients for OAuth token exchange, API calls, and long-running AI generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;
use std::time::Duration;

use outreach_core::constants::{extraction, timeouts};
use reqwest::{Client, ClientBuilder};

/// Timeouts applied to the shared API client
#[derive(Debug, Clone, Copy)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: timeouts::HTTP_TIMEOUT_SECS,
            connect_timeout_secs: timeouts::HTTP_CONNECT_TIMEOUT_SECS,
        }
    }
}

static HTTP_CLIENT_CONFIG: OnceLock<HttpClientConfig> = OnceLock::new();
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Install timeouts for the shared client
///
/// Must run before the first call to [`shared_client`]; later calls are ignored.
pub fn initialize_shared_client(config: HttpClientConfig) {
    if HTTP_CLIENT_CONFIG.set(config).is_err() {
        tracing::debug!("HTTP client configuration already initialized");
    }
}

/// Get or create the shared HTTP client
///
/// Used for CRM, registry, and website calls.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let config = HTTP_CLIENT_CONFIG.get().copied().unwrap_or_default();
        create_client_with_timeout(config.timeout_secs, config.connect_timeout_secs)
    })
}

/// Create a new HTTP client with custom timeout settings
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .user_agent(extraction::USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Create a new HTTP client optimized for OAuth flows
///
/// Token exchanges should be fast; a slow endpoint fails the refresh early.
#[must_use]
pub fn oauth_client() -> Client {
    create_client_with_timeout(
        timeouts::OAUTH_TIMEOUT_SECS,
        timeouts::OAUTH_CONNECT_TIMEOUT_SECS,
    )
}

/// Create a new HTTP client for AI generation calls
#[must_use]
pub fn llm_client() -> Client {
    create_client_with_timeout(
        timeouts::LLM_TIMEOUT_SECS,
        timeouts::HTTP_CONNECT_TIMEOUT_SECS,
    )
}
