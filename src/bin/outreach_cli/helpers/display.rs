// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Output formatting helpers for outreach-cli
// ABOUTME: Prints connection status, generation outcomes, and report listings

use outreach_core::errors::AppResult;
use outreach_core::models::OutreachReport;
use outreach_intel::oauth2_client::ConnectionStatus;
use outreach_intel::services::GenerationOutcome;
use serde::Serialize;

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an integration's connection status
pub fn display_connection_status(status: &ConnectionStatus) {
    println!("Integration '{}'", status.namespace);
    if !status.connected {
        println!("   Connected: no");
        return;
    }
    println!("   Connected: yes");
    println!("   Token valid: {}", yes_no(status.token_valid));
    println!("   Can refresh: {}", yes_no(status.can_refresh));
    if let Some(expires_at) = status.expires_at {
        println!("   Expires: {}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!(
        "   Location: {}",
        status.location_id.as_deref().unwrap_or("(none)")
    );
}

/// Print warnings of a generation run, then the report as JSON
pub fn display_generation_outcome(outcome: &GenerationOutcome) -> AppResult<()> {
    println!("{}", "=".repeat(80));
    println!("Report for contact {} (model {})", outcome.report.contact_id, outcome.model);
    println!("   Saved: {}", yes_no(outcome.persisted));
    for warning in &outcome.warnings {
        println!("   Warning: {warning}");
    }
    println!("{}", "=".repeat(80));
    print_json(&outcome.report.content)
}

/// One line per report
pub fn display_report_list(reports: &[OutreachReport]) {
    if reports.is_empty() {
        println!("No reports stored");
        return;
    }
    for report in reports {
        println!(
            "{}  {}  {}",
            report.updated_at.format("%Y-%m-%d %H:%M"),
            report.contact_id,
            report.website_url
        );
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
