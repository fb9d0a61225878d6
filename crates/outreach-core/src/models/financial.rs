// ABOUTME: Financial snapshot model and registry country selector
// ABOUTME: Normalized revenue/spending per filing period, ordered latest first
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One filing period of a nonprofit's financials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSnapshot {
    /// Last day of the filing period
    pub period_end: NaiveDate,
    /// Total income for the period
    pub revenue: f64,
    /// Total expenditure for the period
    pub spending: f64,
    /// Always `revenue - spending`
    pub net_income: f64,
}

impl FinancialSnapshot {
    /// Build a snapshot, deriving net income
    #[must_use]
    pub fn new(period_end: NaiveDate, revenue: f64, spending: f64) -> Self {
        Self {
            period_end,
            revenue,
            spending,
            net_income: revenue - spending,
        }
    }
}

/// Order snapshots by period end, latest first
pub fn sort_latest_first(snapshots: &mut [FinancialSnapshot]) {
    snapshots.sort_by(|a, b| b.period_end.cmp(&a.period_end));
}

/// Country whose nonprofit registry holds the organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryCountry {
    /// United Kingdom (Charity Commission register)
    Uk,
    /// United States (IRS Form 990 filings)
    Us,
}

impl RegistryCountry {
    /// Stable lowercase identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uk => "uk",
            Self::Us => "us",
        }
    }
}

impl fmt::Display for RegistryCountry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistryCountry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uk" | "gb" | "gbr" | "united kingdom" | "england" => Ok(Self::Uk),
            "us" | "usa" | "united states" | "united states of america" => Ok(Self::Us),
            other => Err(format!("unsupported registry country: {other}")),
        }
    }
}
