// ABOUTME: Report generation use case orchestrating research, synthesis, and storage
// ABOUTME: Concurrent enrichment fetches, soft-failure warnings, templating, and upsert
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Report Generation
//!
//! One call to [`ReportGenerationService::generate`] runs the whole pipeline
//! for a single contact:
//!
//! 1. website text, optional page, financials, and CRM contact in parallel
//! 2. one synthesis call
//! 3. placeholder templating
//! 4. upsert into the report store
//! 5. optional CRM note
//!
//! Enrichment failures and post-synthesis failures become
//! [`GenerationWarning`]s. Website, credential, and synthesis failures abort.

use std::fmt;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use outreach_core::errors::{OutreachError, OutreachResult};
use outreach_core::models::{
    FinancialSnapshot, OutreachReport, RegistryCountry, ReportContentPatch,
};
use serde::Serialize;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::crm::{Contact, CrmClient};
use crate::database::ReportStore;
use crate::external::{FinancialRegistryClient, WebsiteExtractor};
use crate::intelligence::{apply_placeholders, Personalization, ReportSynthesizer, SynthesisInput};
use crate::logging::AppLogger;

/// Inputs for one report
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Owning user
    pub user_id: Uuid,
    /// CRM contact the report is for
    pub contact_id: String,
    /// Organization website
    pub website_url: String,
    /// Page with more specific context
    pub specific_url: Option<String>,
    /// Registry to query for financials
    pub country: Option<RegistryCountry>,
    /// Charity registration number or EIN
    pub organization_identifier: Option<String>,
    /// Free-text note from the sender
    pub insight: Option<String>,
    /// Known placeholder values; gaps are filled from the CRM contact
    pub personalization: Personalization,
    /// CRM integration namespace
    pub namespace: Option<String>,
    /// Add a summary note to the CRM contact
    pub sync_note: bool,
}

impl GenerationRequest {
    /// Request with only the required fields set
    #[must_use]
    pub fn new(
        user_id: Uuid,
        contact_id: impl Into<String>,
        website_url: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            contact_id: contact_id.into(),
            website_url: website_url.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> OutreachResult<()> {
        if self.contact_id.trim().is_empty() {
            return Err(OutreachError::InvalidInput(
                "contact id must not be empty".to_owned(),
            ));
        }
        if self.website_url.trim().is_empty() {
            return Err(OutreachError::InvalidInput(
                "website url must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|ns| !ns.trim().is_empty())
    }
}

/// Non-fatal degradation recorded during generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    /// The optional specific page could not be fetched
    SpecificPageUnavailable {
        /// Requested page
        url: String,
        /// Failure description
        reason: String,
    },
    /// An identifier was supplied but no financials were retrieved
    FinancialsUnavailable {
        /// Registry country
        country: RegistryCountry,
        /// Identifier looked up
        identifier: String,
    },
    /// The CRM contact could not be read for personalization
    ContactLookupFailed {
        /// Failure description
        reason: String,
    },
    /// The report was generated but not stored
    PersistenceFailed {
        /// Failure description
        reason: String,
    },
    /// The CRM note could not be added
    CrmSyncFailed {
        /// Failure description
        reason: String,
    },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpecificPageUnavailable { url, reason } => {
                write!(f, "specific page {url} unavailable: {reason}")
            }
            Self::FinancialsUnavailable {
                country,
                identifier,
            } => write!(f, "no {country} financials found for {identifier}"),
            Self::ContactLookupFailed { reason } => write!(f, "contact lookup failed: {reason}"),
            Self::PersistenceFailed { reason } => write!(f, "report not saved: {reason}"),
            Self::CrmSyncFailed { reason } => write!(f, "CRM note not added: {reason}"),
        }
    }
}

/// Result of a generation run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    /// Templated report, returned even when it was not stored
    pub report: OutreachReport,
    /// Whether the upsert succeeded
    pub persisted: bool,
    /// Soft failures in pipeline order
    pub warnings: Vec<GenerationWarning>,
    /// Model that produced the content
    pub model: String,
}

/// Outreach report generation use case
#[derive(Clone)]
pub struct ReportGenerationService {
    extractor: WebsiteExtractor,
    registry: FinancialRegistryClient,
    synthesizer: ReportSynthesizer,
    store: Arc<dyn ReportStore>,
    crm: Option<CrmClient>,
}

impl ReportGenerationService {
    /// Create a service without CRM access
    #[must_use]
    pub fn new(
        extractor: WebsiteExtractor,
        registry: FinancialRegistryClient,
        synthesizer: ReportSynthesizer,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        Self {
            extractor,
            registry,
            synthesizer,
            store,
            crm: None,
        }
    }

    /// Enable contact lookup and note sync
    #[must_use]
    pub fn with_crm(mut self, crm: CrmClient) -> Self {
        self.crm = Some(crm);
        self
    }

    /// Run the pipeline for one contact
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a blank contact id or website
    /// - `FetchError` when the website cannot be read
    /// - a credential error when the CRM contact is needed and the token is unusable
    /// - `GenerationFailed` or `MalformedGenerationOutput` from synthesis
    #[instrument(
        skip(self, request),
        fields(user.id = %request.user_id, report.contact_id = %request.contact_id)
    )]
    pub async fn generate(&self, request: GenerationRequest) -> OutreachResult<GenerationOutcome> {
        request.validate()?;
        let started = Instant::now();
        let mut warnings = Vec::new();

        let (website, specific_page, financials, contact) = tokio::join!(
            self.extractor.extract_text(&request.website_url),
            self.fetch_specific_page(request.specific_url.as_deref()),
            self.fetch_financials(&request),
            self.lookup_contact(&request),
        );

        let website_text = website?;

        let contact = match contact {
            Ok(contact) => contact,
            Err(error) if error.is_credential_error() => return Err(error),
            Err(error) => {
                warnings.push(GenerationWarning::ContactLookupFailed {
                    reason: error.to_string(),
                });
                None
            }
        };

        let specific_page_text = match (specific_page, request.specific_url.as_deref()) {
            (Some(Ok(text)), _) => Some(text),
            (Some(Err(error)), Some(url)) => {
                warnings.push(GenerationWarning::SpecificPageUnavailable {
                    url: url.to_owned(),
                    reason: error.to_string(),
                });
                None
            }
            _ => None,
        };

        if financials.is_none() {
            if let (Some(country), Some(identifier)) =
                (request.country, lookup_identifier(&request))
            {
                warnings.push(GenerationWarning::FinancialsUnavailable {
                    country,
                    identifier: identifier.to_owned(),
                });
            }
        }

        let personalization = match contact {
            Some(contact) => request.personalization.clone().or(personalization_from(&contact)),
            None => request.personalization.clone(),
        };

        let input = SynthesisInput {
            organization_name: personalization.organization_name.clone(),
            website_url: request.website_url.clone(),
            website_text,
            specific_url: request.specific_url.clone(),
            specific_page_text,
            financials: financials.clone(),
            country: request.country,
            insight: request.insight.clone(),
        };
        let synthesized = self.synthesizer.synthesize(&input).await?;

        let now = Utc::now();
        let report = OutreachReport {
            user_id: request.user_id,
            contact_id: request.contact_id.clone(),
            organization_identifier: lookup_identifier(&request).map(str::to_owned),
            country: request.country,
            website_url: request.website_url.clone(),
            specific_url: request.specific_url.clone(),
            content: apply_placeholders(synthesized.content, &personalization),
            financial_data: financials,
            created_at: now,
            updated_at: now,
        };

        let persisted = match self.store.upsert_report(&report).await {
            Ok(()) => true,
            Err(error) => {
                warn!(error = %error, "Generated report could not be saved");
                warnings.push(GenerationWarning::PersistenceFailed {
                    reason: error.to_string(),
                });
                false
            }
        };

        if request.sync_note {
            if let Some(namespace) = request.namespace() {
                if let Err(error) = self.sync_note(&request, namespace, &report).await {
                    warn!(error = %error, "CRM note sync failed");
                    warnings.push(GenerationWarning::CrmSyncFailed {
                        reason: error.to_string(),
                    });
                }
            }
        }

        AppLogger::log_report_generated(
            request.user_id,
            &request.contact_id,
            &synthesized.model,
            persisted,
            warnings.len(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );

        Ok(GenerationOutcome {
            report,
            persisted,
            warnings,
            model: synthesized.model,
        })
    }

    /// Store a previously generated report again without regenerating it
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` when the write fails
    pub async fn save(&self, report: &OutreachReport) -> OutreachResult<()> {
        self.store.upsert_report(report).await
    }

    /// Replace the editable email bodies of a stored report
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when the patch is empty
    /// - `ReportNotFound` when no report is stored for the key
    /// - `PersistenceError` when the store fails
    pub async fn update_report(
        &self,
        user_id: Uuid,
        contact_id: &str,
        patch: &ReportContentPatch,
    ) -> OutreachResult<OutreachReport> {
        if patch.is_empty() {
            return Err(OutreachError::InvalidInput(
                "update must set emailBody or followUpBody".to_owned(),
            ));
        }
        self.store.merge_update(user_id, contact_id, patch).await
    }

    /// Stored report for (user, contact)
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` when the read fails
    pub async fn get_report(
        &self,
        user_id: Uuid,
        contact_id: &str,
    ) -> OutreachResult<Option<OutreachReport>> {
        self.store.get_report(user_id, contact_id).await
    }

    /// All reports of a user, most recently updated first
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` when the read fails
    pub async fn list_reports(&self, user_id: Uuid) -> OutreachResult<Vec<OutreachReport>> {
        self.store.list_reports(user_id).await
    }

    async fn fetch_specific_page(&self, url: Option<&str>) -> Option<OutreachResult<String>> {
        let url = url.filter(|u| !u.trim().is_empty())?;
        Some(self.extractor.extract_text(url).await)
    }

    async fn fetch_financials(
        &self,
        request: &GenerationRequest,
    ) -> Option<Vec<FinancialSnapshot>> {
        let country = request.country?;
        let identifier = lookup_identifier(request)?;
        self.registry.fetch_financials(country, identifier).await
    }

    /// Contact used to fill personalization gaps; `None` when not needed
    async fn lookup_contact(&self, request: &GenerationRequest) -> OutreachResult<Option<Contact>> {
        if request.personalization.is_complete() {
            return Ok(None);
        }
        let (Some(crm), Some(namespace)) = (&self.crm, request.namespace()) else {
            return Ok(None);
        };
        crm.get_contact(request.user_id, namespace, &request.contact_id)
            .await
            .map(Some)
    }

    async fn sync_note(
        &self,
        request: &GenerationRequest,
        namespace: &str,
        report: &OutreachReport,
    ) -> OutreachResult<()> {
        let Some(crm) = &self.crm else {
            return Err(OutreachError::InvalidInput(
                "no CRM client configured".to_owned(),
            ));
        };
        crm.add_note(
            request.user_id,
            namespace,
            &request.contact_id,
            &note_summary(report),
        )
        .await
        .map(|_| ())
    }
}

fn lookup_identifier(request: &GenerationRequest) -> Option<&str> {
    request
        .organization_identifier
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

fn personalization_from(contact: &Contact) -> Personalization {
    Personalization {
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        organization_name: contact.company_name.clone(),
        sender_name: None,
    }
}

/// Plain-text CRM note listing insights and subject lines
fn note_summary(report: &OutreachReport) -> String {
    let mut note = String::from("Outreach report generated\n\nInsights:\n");
    for insight in &report.content.insights {
        let _ = writeln!(note, "- {insight}");
    }
    note.push_str("\nSubject lines:\n");
    for subject in &report.content.subject_lines {
        let _ = writeln!(note, "- {subject}");
    }
    note.trim_end().to_owned()
}
