// ABOUTME: Prompt construction for outreach report synthesis
// ABOUTME: Compile-time system prompt plus a user prompt built from research inputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Outreach Prompts
//!
//! The system prompt is loaded at compile time from markdown. The user prompt
//! embeds the website text, optional page text, a financial summary, and the
//! sender's insight.

use std::fmt::Write;

use outreach_core::constants::generation::PROMPT_FINANCIAL_PERIODS;
use outreach_core::models::{FinancialSnapshot, RegistryCountry};

use super::synthesizer::SynthesisInput;

/// Outreach researcher system prompt
pub const OUTREACH_SYSTEM_PROMPT: &str = include_str!("prompts/outreach_system.md");

/// Get the system prompt for report synthesis
#[must_use]
pub const fn system_prompt() -> &'static str {
    OUTREACH_SYSTEM_PROMPT
}

/// Build the user prompt for one report
#[must_use]
pub fn build_user_prompt(input: &SynthesisInput) -> String {
    let mut prompt = String::new();

    if let Some(name) = input.organization_name.as_deref().filter(|n| !n.trim().is_empty()) {
        let _ = writeln!(prompt, "Organization: {}", name.trim());
    }
    let _ = writeln!(prompt, "Website: {}\n", input.website_url);
    let _ = writeln!(prompt, "## Website content\n\n{}\n", input.website_text.trim());

    if let Some(page_text) = input.specific_page_text.as_deref().filter(|t| !t.trim().is_empty()) {
        let url = input.specific_url.as_deref().unwrap_or("specific page");
        let _ = writeln!(prompt, "## Content from {url}\n\n{}\n", page_text.trim());
    }

    if let Some(financials) = input.financials.as_deref().filter(|f| !f.is_empty()) {
        let _ = writeln!(
            prompt,
            "## Recent financial filings\n\n{}",
            financial_summary(financials, input.country)
        );
    }

    if let Some(insight) = input.insight.as_deref().filter(|i| !i.trim().is_empty()) {
        let _ = writeln!(prompt, "## Sender's note\n\n{}\n", insight.trim());
    }

    prompt.push_str("Return the JSON object now.");
    prompt
}

/// One line per filing period, latest first
#[must_use]
pub fn financial_summary(
    snapshots: &[FinancialSnapshot],
    country: Option<RegistryCountry>,
) -> String {
    let symbol = match country {
        Some(RegistryCountry::Uk) => "£",
        Some(RegistryCountry::Us) => "$",
        None => "",
    };

    snapshots
        .iter()
        .take(PROMPT_FINANCIAL_PERIODS)
        .fold(String::new(), |mut summary, snapshot| {
            let _ = writeln!(
                summary,
                "- Period ending {}: revenue {}, spending {}, net {}",
                snapshot.period_end,
                format_amount(snapshot.revenue, symbol),
                format_amount(snapshot.spending, symbol),
                format_amount(snapshot.net_income, symbol),
            );
            summary
        })
}

/// Whole-unit amount with thousands separators
fn format_amount(amount: f64, symbol: &str) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{symbol}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(year: i32, revenue: f64, spending: f64) -> FinancialSnapshot {
        FinancialSnapshot::new(
            NaiveDate::from_ymd_opt(year, 12, 31).expect("date"),
            revenue,
            spending,
        )
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_234_567.4, "$"), "$1,234,567");
        assert_eq!(format_amount(-2500.0, "£"), "-£2,500");
        assert_eq!(format_amount(999.0, ""), "999");
    }

    #[test]
    fn test_financial_summary_limits_periods() {
        let snapshots: Vec<_> = (2019..=2023).rev().map(|y| snapshot(y, 100.0, 50.0)).collect();
        let summary = financial_summary(&snapshots, Some(RegistryCountry::Us));

        assert_eq!(summary.lines().count(), PROMPT_FINANCIAL_PERIODS);
        assert!(summary.starts_with("- Period ending 2023-12-31: revenue $100"));
    }

    #[test]
    fn test_user_prompt_sections() {
        let input = SynthesisInput {
            website_url: "https://acme.org".to_owned(),
            website_text: "Acme Foundation reduces hunger.".to_owned(),
            insight: Some("met CEO at conference".to_owned()),
            ..SynthesisInput::default()
        };
        let prompt = build_user_prompt(&input);

        assert!(prompt.contains("Acme Foundation reduces hunger."));
        assert!(prompt.contains("met CEO at conference"));
        assert!(!prompt.contains("financial filings"));
    }

    #[test]
    fn test_system_prompt_keeps_placeholders_literal() {
        assert!(system_prompt().contains("[First Name]"));
        assert!(system_prompt().contains("[Your Name]"));
    }
}
