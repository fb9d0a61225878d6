// ABOUTME: Database management for integration credentials and outreach reports
// ABOUTME: SQLite pool setup, schema migration, and encrypted token storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Two tables back the pipeline:
//!
//! - `integration_credentials`: one encrypted OAuth credential per (user, namespace)
//! - `outreach_reports`: one generated report per (user, contact)
//!
//! Both are written only through atomic single-row statements or a local
//! transaction; nothing here spans an external call.

mod credentials;
mod reports;

use std::str::FromStr;
use std::sync::Arc;

pub use credentials::{NewCredential, RefreshedCredential};
pub use reports::ReportStore;

use outreach_core::errors::DatabaseError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::crypto::TokenCipher;

/// Database manager for credential and report storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
    cipher: Arc<TokenCipher>,
}

impl Database {
    /// Open (creating if missing) the database and run migrations
    ///
    /// In-memory URLs get a single pooled connection that is never recycled,
    /// so every query sees the same database.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, the key is
    /// rejected, or a migration fails
    pub async fn new(database_url: &str, encryption_key: [u8; 32]) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let db = Self {
            pool,
            cipher: Arc::new(TokenCipher::new(&encryption_key)?),
        };
        db.migrate().await?;

        debug!(database.url = %redact_url(database_url), "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a table or index cannot be created
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        self.migrate_integration_credentials().await?;
        self.migrate_outreach_reports().await?;
        Ok(())
    }

    pub(crate) fn cipher(&self) -> &TokenCipher {
        &self.cipher
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn redact_url(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}
