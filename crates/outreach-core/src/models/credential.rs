// ABOUTME: Integration credential model for CRM OAuth connections
// ABOUTME: Access/refresh token pair with strict expiry semantics and a refresh generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decrypted OAuth credential for one (user, namespace) connection
#[derive(Clone, Serialize, Deserialize)]
pub struct IntegrationCredential {
    /// Owning user
    pub user_id: Uuid,
    /// Integration namespace (one per connected external account)
    pub namespace: String,
    /// Bearer access token
    pub access_token: String,
    /// Refresh token; absent means the credential cannot self-heal
    pub refresh_token: Option<String>,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
    /// CRM location (sub-account) the token is scoped to
    pub location_id: Option<String>,
    /// Incremented on every successful refresh, guards concurrent writes
    pub generation: i64,
    /// When the connection was first made
    pub created_at: DateTime<Utc>,
    /// Last write
    pub updated_at: DateTime<Utc>,
}

impl IntegrationCredential {
    /// Whether the access token may still be used at `now`
    ///
    /// A token expiring exactly at `now` is already expired.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Whether an expired credential can be renewed
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    /// Token handed to CRM callers
    #[must_use]
    pub fn to_valid_token(&self) -> ValidToken {
        ValidToken {
            access_token: self.access_token.clone(),
            location_id: self.location_id.clone(),
            expires_at: self.expires_at,
        }
    }
}

impl fmt::Debug for IntegrationCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationCredential")
            .field("user_id", &self.user_id)
            .field("namespace", &self.namespace)
            .field("access_token", &"[REDACTED]")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("location_id", &self.location_id)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Access token usable for exactly one logical operation
#[derive(Clone, PartialEq, Eq)]
pub struct ValidToken {
    /// Bearer access token
    pub access_token: String,
    /// CRM location the token is scoped to
    pub location_id: Option<String>,
    /// Expiry of the access token
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for ValidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidToken")
            .field("access_token", &"[REDACTED]")
            .field("location_id", &self.location_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
