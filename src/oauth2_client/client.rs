// ABOUTME: OAuth2 client for the CRM platform token endpoint
// ABOUTME: Authorization URL building, code exchange, and refresh-token exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use outreach_core::constants::crm;
use outreach_core::errors::AppResult;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::CrmConfig;
use crate::utils::http_client::oauth_client;

/// OAuth 2.0 client configuration
#[derive(Clone)]
pub struct OAuth2Config {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Authorization page URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Redirect URI for the authorization code flow
    pub redirect_uri: Option<String>,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
}

impl OAuth2Config {
    /// Build from CRM settings
    ///
    /// # Errors
    ///
    /// Returns a config error if the client id or secret is missing
    pub fn from_crm_config(config: &CrmConfig) -> AppResult<Self> {
        let (client_id, client_secret) = config.client_credentials()?;
        Ok(Self {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            auth_url: crm::AUTHORIZATION_URL.to_owned(),
            token_url: config.token_url.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: crm::DEFAULT_SCOPES.iter().map(|&s| s.to_owned()).collect(),
        })
    }
}

impl fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

/// Tokens issued by the token endpoint
#[derive(Clone)]
pub struct OAuth2Token {
    /// The access token string
    pub access_token: String,
    /// Token type (usually "Bearer")
    pub token_type: String,
    /// Expiration timestamp (UTC)
    pub expires_at: DateTime<Utc>,
    /// Refresh token; the platform rotates it on every refresh
    pub refresh_token: Option<String>,
    /// Granted OAuth scopes
    pub scope: Option<String>,
    /// Location the token is scoped to
    pub location_id: Option<String>,
}

impl fmt::Debug for OAuth2Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Token")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("location_id", &self.location_id)
            .finish_non_exhaustive()
    }
}

/// Failure talking to the token endpoint
#[derive(Debug, thiserror::Error)]
pub enum TokenExchangeError {
    /// The endpoint answered with a non-success status
    #[error("token endpoint returned {status}: {message}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Error description from the body, if any
        message: String,
    },

    /// The request never produced a response
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered 2xx with an unusable body
    #[error("token response could not be parsed: {0}")]
    InvalidResponse(String),
}

impl TokenExchangeError {
    /// HTTP status, if a response was received
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(_) | Self::InvalidResponse(_) => None,
        }
    }
}

/// OAuth 2.0 client for the CRM platform
pub struct OAuth2Client {
    config: OAuth2Config,
    client: reqwest::Client,
}

impl OAuth2Client {
    /// Create a new `OAuth2` client with the given configuration
    #[must_use]
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            client: oauth_client(),
        }
    }

    /// Get the `OAuth2` configuration
    #[must_use]
    pub const fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Get the authorization URL a user opens to connect a location
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization URL is malformed
    pub fn get_authorization_url(&self, state: &str) -> Result<String, url::ParseError> {
        let mut url = Url::parse(&self.config.auth_url)?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.config.client_id)
                .append_pair("scope", &self.config.scopes.join(" "))
                .append_pair("state", state);
            if let Some(redirect_uri) = &self.config.redirect_uri {
                query.append_pair("redirect_uri", redirect_uri);
            }
        }

        Ok(url.to_string())
    }

    /// Exchange authorization code for tokens
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rejected, or the body is invalid
    pub async fn exchange_code(&self, code: &str) -> Result<OAuth2Token, TokenExchangeError> {
        let mut params = vec![
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];
        if let Some(redirect_uri) = self.config.redirect_uri.as_deref() {
            params.push(("redirect_uri", redirect_uri));
        }

        self.post_token_request(&params).await
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rejected, or the body is invalid
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<OAuth2Token, TokenExchangeError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        self.post_token_request(&params).await
    }

    async fn post_token_request(
        &self,
        params: &[(&str, &str)],
    ) -> Result<OAuth2Token, TokenExchangeError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = Self::error_message(status, &body);
            warn!(http.status = status.as_u16(), "Token endpoint rejected request: {message}");
            return Err(TokenExchangeError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| TokenExchangeError::InvalidResponse(e.to_string()))?;
        if response.access_token.trim().is_empty() {
            return Err(TokenExchangeError::InvalidResponse(
                "empty access_token".to_owned(),
            ));
        }

        debug!("Token endpoint issued new access token");
        Self::token_from_response(response, Utc::now())
    }

    fn error_message(status: StatusCode, body: &str) -> String {
        serde_json::from_str::<TokenErrorResponse>(body)
            .ok()
            .and_then(|e| e.error_description.or(e.message).or(e.error))
            .unwrap_or_else(|| {
                let snippet: String = body.chars().take(200).collect();
                if snippet.trim().is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_owned()
                } else {
                    snippet
                }
            })
    }

    fn token_from_response(
        response: TokenResponse,
        issued_at: DateTime<Utc>,
    ) -> Result<OAuth2Token, TokenExchangeError> {
        let lifetime = response
            .expires_in
            .unwrap_or(crm::DEFAULT_TOKEN_LIFETIME_SECS);
        let expires_at = i64::try_from(lifetime)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|delta| issued_at.checked_add_signed(delta))
            .ok_or_else(|| {
                TokenExchangeError::InvalidResponse(format!("expires_in {lifetime} out of range"))
            })?;

        Ok(OAuth2Token {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_owned()),
            expires_at,
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            scope: response.scope,
            location_id: response.location_id,
        })
    }
}

/// OAuth 2.0 token response from the CRM platform
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<u64>,
    refresh_token: Option<String>,
    scope: Option<String>,
    #[serde(rename = "locationId")]
    location_id: Option<String>,
}

/// Error body returned by the token endpoint
#[derive(Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
}
