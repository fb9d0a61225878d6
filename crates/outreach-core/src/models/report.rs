// ABOUTME: Outreach report model with structured generated content
// ABOUTME: Report content fields, partial-update patch, and merge semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::financial::{FinancialSnapshot, RegistryCountry};

/// Structured outreach content produced by the synthesizer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContent {
    /// Research insights about the organization
    pub insights: Vec<String>,
    /// Subject line variants for the first email
    pub subject_lines: Vec<String>,
    /// First email body
    pub email_body: String,
    /// Subject line variants for the follow-up email
    pub follow_up_subject_lines: Vec<String>,
    /// Follow-up email body
    pub follow_up_body: String,
    /// LinkedIn connection request note
    pub linkedin_connection_note: String,
    /// LinkedIn message after connecting
    pub linkedin_follow_up: String,
    /// Cold-call script
    pub call_script: String,
}

impl ReportContent {
    /// Overlay the fields present in `patch`, keeping all others
    pub fn apply_patch(&mut self, patch: &ReportContentPatch) {
        if let Some(email_body) = &patch.email_body {
            email_body.clone_into(&mut self.email_body);
        }
        if let Some(follow_up_body) = &patch.follow_up_body {
            follow_up_body.clone_into(&mut self.follow_up_body);
        }
    }
}

/// Partial update of a stored report; only email bodies are editable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContentPatch {
    /// Replacement first email body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_body: Option<String>,
    /// Replacement follow-up body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_body: Option<String>,
}

impl ReportContentPatch {
    /// Whether the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email_body.is_none() && self.follow_up_body.is_none()
    }
}

/// Generated report for one (user, contact) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachReport {
    /// Owning user
    pub user_id: Uuid,
    /// CRM contact id
    pub contact_id: String,
    /// Charity registration number or EIN
    pub organization_identifier: Option<String>,
    /// Registry the identifier belongs to
    pub country: Option<RegistryCountry>,
    /// Organization website
    pub website_url: String,
    /// Optional page with more specific context
    pub specific_url: Option<String>,
    /// Generated content
    pub content: ReportContent,
    /// Financial history embedded at generation time, latest first
    pub financial_data: Option<Vec<FinancialSnapshot>>,
    /// First stored
    pub created_at: DateTime<Utc>,
    /// Last stored
    pub updated_at: DateTime<Utc>,
}
