// ABOUTME: Token lifecycle manager guaranteeing a valid CRM access token per call
// ABOUTME: Serializes refreshes per (user, namespace) and persists them with compare-and-swap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Token Lifecycle
//!
//! Every CRM call goes through [`TokenLifecycleManager::get_valid_token`]. A
//! stored token is returned as-is while `now < expires_at`. Otherwise exactly one
//! refresh exchange is attempted, under a per-(user, namespace) lock so
//! concurrent callers in this process share the outcome. The refreshed row is
//! written with a generation compare-and-swap so a writer in another process
//! never has its rotated refresh token overwritten.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use outreach_core::errors::{OutreachError, OutreachResult};
use outreach_core::models::{IntegrationCredential, ValidToken};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::client::{OAuth2Client, OAuth2Token, TokenExchangeError};
use crate::database::{Database, NewCredential, RefreshedCredential};
use crate::logging::AppLogger;

type CredentialKey = (Uuid, String);

/// Connection state of one integration, without token material
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    /// Integration namespace
    pub namespace: String,
    /// Whether a credential row exists
    pub connected: bool,
    /// Whether the stored access token is still usable
    pub token_valid: bool,
    /// Whether an expired token could be refreshed
    pub can_refresh: bool,
    /// Access token expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// CRM location the credential is scoped to
    pub location_id: Option<String>,
}

impl ConnectionStatus {
    fn disconnected(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_owned(),
            connected: false,
            token_valid: false,
            can_refresh: false,
            expires_at: None,
            location_id: None,
        }
    }

    fn from_credential(credential: &IntegrationCredential) -> Self {
        Self {
            namespace: credential.namespace.clone(),
            connected: true,
            token_valid: credential.is_valid_at(Utc::now()),
            can_refresh: credential.can_refresh(),
            expires_at: Some(credential.expires_at),
            location_id: credential.location_id.clone(),
        }
    }
}

/// Hands out valid access tokens, refreshing and persisting them as needed
pub struct TokenLifecycleManager {
    database: Database,
    oauth: OAuth2Client,
    refresh_locks: DashMap<CredentialKey, Arc<Mutex<()>>>,
}

impl TokenLifecycleManager {
    /// Create a manager over the credential store and token endpoint
    #[must_use]
    pub fn new(database: Database, oauth: OAuth2Client) -> Self {
        Self {
            database,
            oauth,
            refresh_locks: DashMap::new(),
        }
    }

    /// OAuth client used for exchanges
    #[must_use]
    pub const fn oauth_client(&self) -> &OAuth2Client {
        &self.oauth
    }

    /// Return a token that is valid at the moment of return
    ///
    /// # Errors
    ///
    /// - `IntegrationNotConnected` when no credential is stored
    /// - `RefreshTokenMissing` when the token expired and cannot be refreshed
    /// - `RefreshFailed` when the token endpoint rejects or fails the exchange
    /// - `PersistenceError` when the credential cannot be read or written
    #[instrument(skip(self), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn get_valid_token(
        &self,
        user_id: Uuid,
        namespace: &str,
    ) -> OutreachResult<ValidToken> {
        let credential = self.load_credential(user_id, namespace).await?;
        if credential.is_valid_at(Utc::now()) {
            return Ok(credential.to_valid_token());
        }

        debug!(expires_at = %credential.expires_at, "Access token expired, refreshing");
        self.refresh_serialized(user_id, namespace).await
    }

    /// Exchange an authorization code and store the resulting credential
    ///
    /// Replaces any existing credential for the pair.
    ///
    /// # Errors
    ///
    /// Returns `CrmRequestFailed` if the exchange fails, or `PersistenceError`
    /// if the credential cannot be stored
    #[instrument(skip(self, code), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn connect(
        &self,
        user_id: Uuid,
        namespace: &str,
        code: &str,
    ) -> OutreachResult<ConnectionStatus> {
        if code.trim().is_empty() {
            return Err(OutreachError::InvalidInput(
                "authorization code must not be empty".to_owned(),
            ));
        }

        let token = self
            .oauth
            .exchange_code(code.trim())
            .await
            .map_err(|e| OutreachError::CrmRequestFailed {
                endpoint: self.oauth.config().token_url.clone(),
                status: e.status(),
                message: e.to_string(),
            })?;

        self.store_token(user_id, namespace, &token).await?;
        info!(location.id = ?token.location_id, "Integration connected");
        self.connection_status(user_id, namespace).await
    }

    /// Store an already-issued token pair, replacing any existing credential
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the credential cannot be stored
    pub async fn store_token(
        &self,
        user_id: Uuid,
        namespace: &str,
        token: &OAuth2Token,
    ) -> OutreachResult<()> {
        self.database
            .upsert_integration_credential(&NewCredential {
                user_id,
                namespace,
                access_token: &token.access_token,
                refresh_token: token.refresh_token.as_deref(),
                expires_at: token.expires_at,
                location_id: token.location_id.as_deref(),
            })
            .await
            .map_err(|e| OutreachError::persistence("store credential", e))
    }

    /// Remove the stored credential; returns whether one existed
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the delete fails
    #[instrument(skip(self), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn disconnect(&self, user_id: Uuid, namespace: &str) -> OutreachResult<bool> {
        let removed = self
            .database
            .delete_integration_credential(user_id, namespace)
            .await
            .map_err(|e| OutreachError::persistence("delete credential", e))?;
        self.refresh_locks.remove(&(user_id, namespace.to_owned()));

        if removed {
            info!("Integration disconnected");
        }
        Ok(removed)
    }

    /// Describe the stored credential without exposing tokens
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the credential cannot be read
    pub async fn connection_status(
        &self,
        user_id: Uuid,
        namespace: &str,
    ) -> OutreachResult<ConnectionStatus> {
        let credential = self
            .database
            .get_integration_credential(user_id, namespace)
            .await
            .map_err(|e| OutreachError::persistence("read credential", e))?;

        Ok(credential.map_or_else(
            || ConnectionStatus::disconnected(namespace),
            |c| ConnectionStatus::from_credential(&c),
        ))
    }

    async fn load_credential(
        &self,
        user_id: Uuid,
        namespace: &str,
    ) -> OutreachResult<IntegrationCredential> {
        self.database
            .get_integration_credential(user_id, namespace)
            .await
            .map_err(|e| OutreachError::persistence("read credential", e))?
            .ok_or_else(|| OutreachError::IntegrationNotConnected {
                user_id,
                namespace: namespace.to_owned(),
            })
    }

    fn refresh_lock(&self, user_id: Uuid, namespace: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry((user_id, namespace.to_owned()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn refresh_serialized(
        &self,
        user_id: Uuid,
        namespace: &str,
    ) -> OutreachResult<ValidToken> {
        let lock = self.refresh_lock(user_id, namespace);
        let _guard = lock.lock().await;

        // Whoever held the lock before us may already have refreshed
        let credential = self.load_credential(user_id, namespace).await?;
        if credential.is_valid_at(Utc::now()) {
            debug!("Credential refreshed by a concurrent caller");
            return Ok(credential.to_valid_token());
        }

        let Some(refresh_token) = credential
            .refresh_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
        else {
            return Err(OutreachError::RefreshTokenMissing {
                user_id,
                namespace: namespace.to_owned(),
            });
        };

        match self.oauth.refresh_token(refresh_token).await {
            Ok(token) => self.persist_refresh(&credential, token).await,
            Err(error) => self.recover_failed_refresh(&credential, error).await,
        }
    }

    async fn persist_refresh(
        &self,
        previous: &IntegrationCredential,
        token: OAuth2Token,
    ) -> OutreachResult<ValidToken> {
        let stored = self
            .database
            .update_refreshed_credential(
                previous.user_id,
                &previous.namespace,
                previous.generation,
                &RefreshedCredential {
                    access_token: &token.access_token,
                    refresh_token: token.refresh_token.as_deref(),
                    expires_at: token.expires_at,
                    location_id: token.location_id.as_deref(),
                },
            )
            .await
            .map_err(|e| OutreachError::persistence("store refreshed credential", e))?;

        if stored {
            AppLogger::log_token_refresh(
                previous.user_id,
                &previous.namespace,
                true,
                previous.generation + 1,
            );
            return Ok(ValidToken {
                access_token: token.access_token,
                location_id: token.location_id.or_else(|| previous.location_id.clone()),
                expires_at: token.expires_at,
            });
        }

        // Another process wrote first; its row is authoritative
        let current = self
            .load_credential(previous.user_id, &previous.namespace)
            .await?;
        if current.is_valid_at(Utc::now()) {
            debug!(
                generation = current.generation,
                "Lost refresh race, using concurrently stored token"
            );
            return Ok(current.to_valid_token());
        }

        Err(OutreachError::RefreshFailed {
            namespace: previous.namespace.clone(),
            status: None,
            reason: "credential changed during refresh".to_owned(),
        })
    }

    async fn recover_failed_refresh(
        &self,
        previous: &IntegrationCredential,
        error: TokenExchangeError,
    ) -> OutreachResult<ValidToken> {
        // A rotated refresh token from another process makes ours invalid
        let current = self
            .load_credential(previous.user_id, &previous.namespace)
            .await?;
        if current.generation != previous.generation && current.is_valid_at(Utc::now()) {
            debug!("Refresh rejected but another writer stored a valid token");
            return Ok(current.to_valid_token());
        }

        warn!(error = %error, "Token refresh failed");
        AppLogger::log_token_refresh(
            previous.user_id,
            &previous.namespace,
            false,
            previous.generation,
        );
        Err(OutreachError::RefreshFailed {
            namespace: previous.namespace.clone(),
            status: error.status(),
            reason: error.to_string(),
        })
    }
}
