// ABOUTME: Outreach report persistence keyed by (user, contact)
// ABOUTME: Latest-write-wins upsert and transactional merge of editable email bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::Utc;
use outreach_core::errors::{DatabaseError, OutreachError, OutreachResult};
use outreach_core::models::{
    FinancialSnapshot, OutreachReport, RegistryCountry, ReportContent, ReportContentPatch,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::Database;

/// Storage contract for generated reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert or replace the report for its (user, contact) key
    ///
    /// Prior content is discarded; `created_at` of the first write is kept.
    async fn upsert_report(&self, report: &OutreachReport) -> OutreachResult<()>;

    /// Overlay `patch` onto the stored report and return the merged result
    ///
    /// Fails with `ReportNotFound` when no report exists; never creates one.
    async fn merge_update(
        &self,
        user_id: Uuid,
        contact_id: &str,
        patch: &ReportContentPatch,
    ) -> OutreachResult<OutreachReport>;

    /// Get the report for (user, contact)
    async fn get_report(
        &self,
        user_id: Uuid,
        contact_id: &str,
    ) -> OutreachResult<Option<OutreachReport>>;

    /// All reports of a user, most recently updated first
    async fn list_reports(&self, user_id: Uuid) -> OutreachResult<Vec<OutreachReport>>;
}

const REPORT_COLUMNS: &str = "user_id, contact_id, organization_identifier, country, website_url, \
     specific_url, content, financial_data, created_at, updated_at";

impl Database {
    /// Create `outreach_reports` table
    pub(super) async fn migrate_outreach_reports(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS outreach_reports (
                user_id TEXT NOT NULL,
                contact_id TEXT NOT NULL,
                organization_identifier TEXT,
                country TEXT,
                website_url TEXT NOT NULL,
                specific_url TEXT,
                content TEXT NOT NULL,
                financial_data TEXT,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                PRIMARY KEY (user_id, contact_id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed {
            table: "outreach_reports",
            reason: e.to_string(),
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_outreach_reports_user_updated ON outreach_reports(user_id, updated_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed {
            table: "outreach_reports",
            reason: e.to_string(),
        })?;

        Ok(())
    }

    async fn write_report(&self, report: &OutreachReport) -> Result<(), DatabaseError> {
        let content = serde_json::to_string(&report.content).map_err(|source| {
            DatabaseError::Serialization {
                context: "report content",
                source,
            }
        })?;
        let financial_data = report
            .financial_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|source| DatabaseError::Serialization {
                context: "financial data",
                source,
            })?;

        sqlx::query(
            r"
            INSERT INTO outreach_reports (
                user_id, contact_id, organization_identifier, country, website_url,
                specific_url, content, financial_data, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id, contact_id)
            DO UPDATE SET
                organization_identifier = EXCLUDED.organization_identifier,
                country = EXCLUDED.country,
                website_url = EXCLUDED.website_url,
                specific_url = EXCLUDED.specific_url,
                content = EXCLUDED.content,
                financial_data = EXCLUDED.financial_data,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(report.user_id.to_string())
        .bind(&report.contact_id)
        .bind(report.organization_identifier.as_deref())
        .bind(report.country.map(RegistryCountry::as_str))
        .bind(&report.website_url)
        .bind(report.specific_url.as_deref())
        .bind(content)
        .bind(financial_data)
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_report(
        &self,
        user_id: Uuid,
        contact_id: &str,
    ) -> Result<Option<OutreachReport>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {REPORT_COLUMNS} FROM outreach_reports WHERE user_id = $1 AND contact_id = $2"
        ))
        .bind(user_id.to_string())
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_report).transpose()
    }

    async fn fetch_reports_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<OutreachReport>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "SELECT {REPORT_COLUMNS} FROM outreach_reports WHERE user_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_report).collect()
    }

    /// Read-modify-write of the editable bodies inside one transaction
    async fn merge_report_content(
        &self,
        user_id: Uuid,
        contact_id: &str,
        patch: &ReportContentPatch,
    ) -> Result<Option<OutreachReport>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {REPORT_COLUMNS} FROM outreach_reports WHERE user_id = $1 AND contact_id = $2"
        ))
        .bind(user_id.to_string())
        .bind(contact_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut report = row_to_report(&row)?;

        if patch.is_empty() {
            return Ok(Some(report));
        }

        report.content.apply_patch(patch);
        report.updated_at = Utc::now();
        let content = serde_json::to_string(&report.content).map_err(|source| {
            DatabaseError::Serialization {
                context: "report content",
                source,
            }
        })?;

        sqlx::query(
            r"
            UPDATE outreach_reports
            SET content = $1, updated_at = $2
            WHERE user_id = $3 AND contact_id = $4
            ",
        )
        .bind(content)
        .bind(report.updated_at)
        .bind(user_id.to_string())
        .bind(contact_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(report))
    }
}

#[async_trait]
impl ReportStore for Database {
    async fn upsert_report(&self, report: &OutreachReport) -> OutreachResult<()> {
        self.write_report(report)
            .await
            .map_err(|e| OutreachError::persistence("upsert report", e))?;
        debug!(
            user.id = %report.user_id,
            report.contact_id = %report.contact_id,
            "Report stored"
        );
        Ok(())
    }

    async fn merge_update(
        &self,
        user_id: Uuid,
        contact_id: &str,
        patch: &ReportContentPatch,
    ) -> OutreachResult<OutreachReport> {
        self.merge_report_content(user_id, contact_id, patch)
            .await
            .map_err(|e| OutreachError::persistence("merge report", e))?
            .ok_or_else(|| OutreachError::ReportNotFound {
                user_id,
                contact_id: contact_id.to_owned(),
            })
    }

    async fn get_report(
        &self,
        user_id: Uuid,
        contact_id: &str,
    ) -> OutreachResult<Option<OutreachReport>> {
        self.fetch_report(user_id, contact_id)
            .await
            .map_err(|e| OutreachError::persistence("get report", e))
    }

    async fn list_reports(&self, user_id: Uuid) -> OutreachResult<Vec<OutreachReport>> {
        self.fetch_reports_for_user(user_id)
            .await
            .map_err(|e| OutreachError::persistence("list reports", e))
    }
}

fn row_to_report(row: &SqliteRow) -> Result<OutreachReport, DatabaseError> {
    let user_id_str: String = row.try_get("user_id")?;
    let user_id = Uuid::parse_str(&user_id_str).map_err(|e| DatabaseError::InvalidData {
        field: "user_id",
        reason: e.to_string(),
    })?;

    let country = row
        .try_get::<Option<String>, _>("country")?
        .map(|raw| {
            raw.parse::<RegistryCountry>()
                .map_err(|reason| DatabaseError::InvalidData {
                    field: "country",
                    reason,
                })
        })
        .transpose()?;

    let content: ReportContent = serde_json::from_str(&row.try_get::<String, _>("content")?)
        .map_err(|source| DatabaseError::Serialization {
            context: "report content",
            source,
        })?;

    let financial_data: Option<Vec<FinancialSnapshot>> = row
        .try_get::<Option<String>, _>("financial_data")?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|source| DatabaseError::Serialization {
            context: "financial data",
            source,
        })?;

    Ok(OutreachReport {
        user_id,
        contact_id: row.try_get("contact_id")?,
        organization_identifier: row.try_get("organization_identifier")?,
        country,
        website_url: row.try_get("website_url")?,
        specific_url: row.try_get("specific_url")?,
        content,
        financial_data,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
