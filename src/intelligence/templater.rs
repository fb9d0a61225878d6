// ABOUTME: Placeholder substitution over generated report content
// ABOUTME: Case-insensitive literal replacement of bracketed personalization tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Placeholder Templater
//!
//! Replaces `[First Name]`, `[Last Name]`, `[Organization Name]`
//! (alias `[Company Name]`), and `[Your Name]` (alias `[Sender Name]`) with
//! resolved values. Tokens without a value stay verbatim.

use outreach_core::constants::placeholders;
use outreach_core::models::ReportContent;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

/// Values for the personalization tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personalization {
    /// Recipient first name
    pub first_name: Option<String>,
    /// Recipient last name
    pub last_name: Option<String>,
    /// Recipient organization
    pub organization_name: Option<String>,
    /// Sender display name
    pub sender_name: Option<String>,
}

impl Personalization {
    /// Whether every recipient-side value is known
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.first_name, &self.last_name, &self.organization_name]
            .iter()
            .all(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// Fill unknown values from `other`, keeping values already set
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let pick = |mine: Option<String>, theirs: Option<String>| {
            mine.filter(|v| !v.trim().is_empty()).or(theirs)
        };
        Self {
            first_name: pick(self.first_name, other.first_name),
            last_name: pick(self.last_name, other.last_name),
            organization_name: pick(self.organization_name, other.organization_name),
            sender_name: pick(self.sender_name, other.sender_name),
        }
    }
}

/// Compiled substitution rules for one personalization
#[derive(Debug, Clone)]
pub struct Templater {
    rules: Vec<(Regex, String)>,
}

impl Templater {
    /// Build rules for every non-blank value
    #[must_use]
    pub fn new(personalization: &Personalization) -> Self {
        let bindings = [
            (placeholders::FIRST_NAME, &personalization.first_name),
            (placeholders::LAST_NAME, &personalization.last_name),
            (placeholders::ORGANIZATION_NAME, &personalization.organization_name),
            (placeholders::COMPANY_NAME, &personalization.organization_name),
            (placeholders::SENDER_NAME, &personalization.sender_name),
            (placeholders::SENDER_NAME_ALT, &personalization.sender_name),
        ];

        let rules = bindings
            .into_iter()
            .filter_map(|(token, value)| {
                let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
                let pattern = Regex::new(&format!("(?i){}", regex::escape(token))).ok()?;
                Some((pattern, value.to_owned()))
            })
            .collect();

        Self { rules }
    }

    /// Substitute every resolved token in `text`
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_owned(), |rendered, (pattern, value)| {
                pattern
                    .replace_all(&rendered, NoExpand(value.as_str()))
                    .into_owned()
            })
    }

    /// Substitute tokens in every text field, list entries included
    pub fn apply(&self, content: &mut ReportContent) {
        if self.rules.is_empty() {
            return;
        }

        for list in [
            &mut content.insights,
            &mut content.subject_lines,
            &mut content.follow_up_subject_lines,
        ] {
            for entry in list.iter_mut() {
                *entry = self.render(entry);
            }
        }

        for text in [
            &mut content.email_body,
            &mut content.follow_up_body,
            &mut content.linkedin_connection_note,
            &mut content.linkedin_follow_up,
            &mut content.call_script,
        ] {
            *text = self.render(text);
        }
    }
}

/// Return `content` with `personalization` applied
#[must_use]
pub fn apply_placeholders(
    mut content: ReportContent,
    personalization: &Personalization,
) -> ReportContent {
    Templater::new(personalization).apply(&mut content);
    content
}
