// ABOUTME: Outreach report commands for outreach-cli
// ABOUTME: Generate, show, list, and partial update of stored reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use clap::Args;
use outreach_core::errors::{AppError, AppResult};
use outreach_core::models::{RegistryCountry, ReportContentPatch};
use outreach_intel::database::ReportStore;
use outreach_intel::intelligence::Personalization;
use outreach_intel::services::GenerationRequest;
use uuid::Uuid;

use crate::helpers::context::CliContext;
use crate::helpers::display::{display_generation_outcome, display_report_list, print_json};

/// Arguments of `report generate`
#[derive(Args)]
pub struct GenerateArgs {
    /// User id
    #[arg(long)]
    pub user: Uuid,
    /// CRM contact id
    #[arg(long)]
    pub contact: String,
    /// Organization website
    #[arg(long)]
    pub website: String,
    /// Page with more specific context
    #[arg(long)]
    pub specific_url: Option<String>,
    /// Registry country (uk or us)
    #[arg(long, requires = "org_id")]
    pub country: Option<RegistryCountry>,
    /// Charity registration number or EIN
    #[arg(long)]
    pub org_id: Option<String>,
    /// Free-text note for the model
    #[arg(long)]
    pub insight: Option<String>,
    /// Recipient first name
    #[arg(long)]
    pub first_name: Option<String>,
    /// Recipient last name
    #[arg(long)]
    pub last_name: Option<String>,
    /// Recipient organization name
    #[arg(long)]
    pub organization: Option<String>,
    /// Sender name
    #[arg(long)]
    pub sender_name: Option<String>,
    /// CRM namespace used for contact lookup and note sync
    #[arg(long)]
    pub namespace: Option<String>,
    /// Add a summary note to the CRM contact
    #[arg(long, requires = "namespace")]
    pub sync_note: bool,
}

/// Generate and store a report
pub async fn generate(context: &CliContext, args: GenerateArgs) -> AppResult<()> {
    let service = context.report_service(args.namespace.is_some())?;

    let request = GenerationRequest {
        specific_url: args.specific_url,
        country: args.country,
        organization_identifier: args.org_id,
        insight: args.insight,
        personalization: Personalization {
            first_name: args.first_name,
            last_name: args.last_name,
            organization_name: args.organization,
            sender_name: args.sender_name,
        },
        namespace: args.namespace,
        sync_note: args.sync_note,
        ..GenerationRequest::new(args.user, args.contact, args.website)
    };

    let outcome = service.generate(request).await?;
    display_generation_outcome(&outcome)
}

/// Print a stored report
pub async fn show(context: &CliContext, user: Uuid, contact: &str) -> AppResult<()> {
    let report = context
        .reports()
        .get_report(user, contact)
        .await?
        .ok_or_else(|| AppError::not_found(format!("report for contact {contact}")))?;
    print_json(&report)
}

/// List a user's reports
pub async fn list(context: &CliContext, user: Uuid) -> AppResult<()> {
    let reports = context.reports().list_reports(user).await?;
    display_report_list(&reports);
    Ok(())
}

/// Replace email bodies of a stored report
pub async fn update(
    context: &CliContext,
    user: Uuid,
    contact: &str,
    email_body: Option<String>,
    follow_up_body: Option<String>,
) -> AppResult<()> {
    let patch = ReportContentPatch {
        email_body,
        follow_up_body,
    };
    if patch.is_empty() {
        return Err(AppError::invalid_input(
            "pass --email-body and/or --follow-up-body",
        ));
    }

    let report = context.reports().merge_update(user, contact, &patch).await?;
    print_json(&report.content)
}
