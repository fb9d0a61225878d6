// ABOUTME: Integration credential persistence with encrypted tokens
// ABOUTME: Upsert on connect, compare-and-swap on refresh, delete on disconnect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use outreach_core::errors::DatabaseError;
use outreach_core::models::IntegrationCredential;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;

/// Tokens received from an authorization code exchange
pub struct NewCredential<'a> {
    /// Owning user
    pub user_id: Uuid,
    /// Integration namespace
    pub namespace: &'a str,
    /// Bearer access token
    pub access_token: &'a str,
    /// Refresh token, if the platform issued one
    pub refresh_token: Option<&'a str>,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
    /// CRM location the token is scoped to
    pub location_id: Option<&'a str>,
}

/// Tokens received from a refresh exchange
pub struct RefreshedCredential<'a> {
    /// Bearer access token
    pub access_token: &'a str,
    /// Rotated refresh token; `None` keeps the stored one
    pub refresh_token: Option<&'a str>,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
    /// Location reported by the token endpoint; `None` keeps the stored one
    pub location_id: Option<&'a str>,
}

fn token_aad(user_id: Uuid, namespace: &str, column: &str) -> String {
    format!("{user_id}:{namespace}:{column}")
}

impl Database {
    /// Create `integration_credentials` table
    pub(super) async fn migrate_integration_credentials(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS integration_credentials (
                user_id TEXT NOT NULL,
                namespace TEXT NOT NULL,
                access_token TEXT NOT NULL,
                refresh_token TEXT,
                expires_at DATETIME NOT NULL,
                location_id TEXT,
                generation INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                PRIMARY KEY (user_id, namespace)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed {
            table: "integration_credentials",
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Insert or replace the credential for (user, namespace)
    ///
    /// Replacing an existing row bumps its generation so any in-flight refresh
    /// of the old tokens loses its compare-and-swap.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption or the database write fails
    pub async fn upsert_integration_credential(
        &self,
        credential: &NewCredential<'_>,
    ) -> Result<(), DatabaseError> {
        let (access_token, refresh_token) = self.seal_tokens(
            credential.user_id,
            credential.namespace,
            credential.access_token,
            credential.refresh_token,
        )?;
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO integration_credentials (
                user_id, namespace, access_token, refresh_token, expires_at,
                location_id, generation, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $7)
            ON CONFLICT (user_id, namespace)
            DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                expires_at = EXCLUDED.expires_at,
                location_id = EXCLUDED.location_id,
                generation = integration_credentials.generation + 1,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(credential.user_id.to_string())
        .bind(credential.namespace)
        .bind(access_token)
        .bind(refresh_token)
        .bind(credential.expires_at)
        .bind(credential.location_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the decrypted credential for (user, namespace)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored token cannot be decrypted
    pub async fn get_integration_credential(
        &self,
        user_id: Uuid,
        namespace: &str,
    ) -> Result<Option<IntegrationCredential>, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT user_id, namespace, access_token, refresh_token, expires_at,
                   location_id, generation, created_at, updated_at
            FROM integration_credentials
            WHERE user_id = $1 AND namespace = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(namespace)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| self.row_to_credential(&row)).transpose()
    }

    /// Store refreshed tokens if the row is still at `expected_generation`
    ///
    /// Returns `false` when another writer got there first; the stored row is
    /// left untouched in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption or the database write fails
    pub async fn update_refreshed_credential(
        &self,
        user_id: Uuid,
        namespace: &str,
        expected_generation: i64,
        refreshed: &RefreshedCredential<'_>,
    ) -> Result<bool, DatabaseError> {
        let (access_token, refresh_token) = self.seal_tokens(
            user_id,
            namespace,
            refreshed.access_token,
            refreshed.refresh_token,
        )?;

        let result = sqlx::query(
            r"
            UPDATE integration_credentials
            SET access_token = $1,
                refresh_token = COALESCE($2, refresh_token),
                expires_at = $3,
                location_id = COALESCE($4, location_id),
                generation = generation + 1,
                updated_at = $5
            WHERE user_id = $6 AND namespace = $7 AND generation = $8
            ",
        )
        .bind(access_token)
        .bind(refresh_token)
        .bind(refreshed.expires_at)
        .bind(refreshed.location_id)
        .bind(Utc::now())
        .bind(user_id.to_string())
        .bind(namespace)
        .bind(expected_generation)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete the credential for (user, namespace)
    ///
    /// Returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_integration_credential(
        &self,
        user_id: Uuid,
        namespace: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r"
            DELETE FROM integration_credentials
            WHERE user_id = $1 AND namespace = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(namespace)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn seal_tokens(
        &self,
        user_id: Uuid,
        namespace: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(String, Option<String>), DatabaseError> {
        let cipher = self.cipher();
        let access = cipher.encrypt(access_token, &token_aad(user_id, namespace, "access"))?;
        let refresh = refresh_token
            .map(|token| cipher.encrypt(token, &token_aad(user_id, namespace, "refresh")))
            .transpose()?;
        Ok((access, refresh))
    }

    fn row_to_credential(&self, row: &SqliteRow) -> Result<IntegrationCredential, DatabaseError> {
        let user_id_str: String = row.try_get("user_id")?;
        let user_id = Uuid::parse_str(&user_id_str).map_err(|e| DatabaseError::InvalidData {
            field: "user_id",
            reason: e.to_string(),
        })?;
        let namespace: String = row.try_get("namespace")?;

        let cipher = self.cipher();
        let access_token = cipher.decrypt(
            &row.try_get::<String, _>("access_token")?,
            &token_aad(user_id, &namespace, "access"),
        )?;
        let refresh_token = row
            .try_get::<Option<String>, _>("refresh_token")?
            .map(|sealed| cipher.decrypt(&sealed, &token_aad(user_id, &namespace, "refresh")))
            .transpose()?;

        Ok(IntegrationCredential {
            user_id,
            namespace,
            access_token,
            refresh_token,
            expires_at: row.try_get("expires_at")?,
            location_id: row.try_get("location_id")?,
            generation: row.try_get("generation")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
