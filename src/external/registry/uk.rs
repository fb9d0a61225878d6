// ABOUTME: UK Charity Commission register client
// ABOUTME: Reads a charity's financial history by registration number
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::NaiveDate;
use outreach_core::constants::registry;
use outreach_core::errors::{OutreachError, OutreachResult};
use outreach_core::models::{FinancialSnapshot, RegistryCountry};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use urlencoding::encode;

use super::{fetch_json, FinancialRegistry};
use crate::utils::http_client::shared_client;

/// Charity Commission register API client
pub struct UkCharityRegistry {
    base_url: String,
    api_key: String,
    http: Client,
}

impl UkCharityRegistry {
    /// Create a client for the register at `base_url`
    #[must_use]
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            http: shared_client().clone(),
        }
    }
}

#[async_trait]
impl FinancialRegistry for UkCharityRegistry {
    fn name(&self) -> &'static str {
        registry::UK_REGISTRY_NAME
    }

    fn country(&self) -> RegistryCountry {
        RegistryCountry::Uk
    }

    #[instrument(skip(self))]
    async fn fetch_filings(&self, identifier: &str) -> OutreachResult<Vec<FinancialSnapshot>> {
        let (number, suffix) = parse_registration_number(identifier)?;
        let url = format!(
            "{}/charityfinancialhistory/{}/{}",
            self.base_url.trim_end_matches('/'),
            encode(number),
            encode(suffix)
        );

        let request = self
            .http
            .get(url)
            .header(registry::UK_SUBSCRIPTION_HEADER, &self.api_key);
        let Some(periods) = fetch_json::<Vec<FinancialPeriod>>(self.name(), request).await? else {
            return Ok(Vec::new());
        };

        let total = periods.len();
        let snapshots: Vec<FinancialSnapshot> =
            periods.into_iter().filter_map(FinancialPeriod::into_snapshot).collect();
        debug!(periods = total, usable = snapshots.len(), "Charity financial history received");
        Ok(snapshots)
    }
}

/// Split `1234567` or `1234567-1` into number and subsidiary suffix
fn parse_registration_number(identifier: &str) -> OutreachResult<(&str, &str)> {
    let identifier = identifier.trim();
    let (number, suffix) = identifier.split_once('-').unwrap_or((identifier, "0"));
    let (number, suffix) = (number.trim(), suffix.trim());

    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if all_digits(number) && all_digits(suffix) {
        Ok((number, suffix))
    } else {
        Err(OutreachError::InvalidInput(format!(
            "invalid charity registration number: {identifier}"
        )))
    }
}

/// One financial period as returned by the register
#[derive(Deserialize)]
struct FinancialPeriod {
    #[serde(alias = "fin_period_end_date", alias = "financial_period_end_date")]
    financial_period_end: Option<String>,
    #[serde(alias = "inc_total", alias = "total_gross_income")]
    income: Option<f64>,
    #[serde(alias = "exp_total", alias = "total_gross_expenditure")]
    expenditure: Option<f64>,
}

impl FinancialPeriod {
    fn into_snapshot(self) -> Option<FinancialSnapshot> {
        let period_end = parse_period_end(self.financial_period_end.as_deref()?)?;
        if self.income.is_none() && self.expenditure.is_none() {
            return None;
        }
        Some(FinancialSnapshot::new(
            period_end,
            self.income.unwrap_or_default(),
            self.expenditure.unwrap_or_default(),
        ))
    }
}

/// Accepts `2023-03-31` and `2023-03-31T00:00:00`
fn parse_period_end(raw: &str) -> Option<NaiveDate> {
    let date = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registration_number() {
        assert_eq!(parse_registration_number(" 1098765 ").expect("plain"), ("1098765", "0"));
        assert_eq!(parse_registration_number("1098765-2").expect("suffix"), ("1098765", "2"));
        assert!(parse_registration_number("SC012345").is_err());
        assert!(parse_registration_number("1098765-").is_err());
    }

    #[test]
    fn test_period_conversion() {
        let period: FinancialPeriod = serde_json::from_str(
            r#"{"financial_period_end_date":"2023-03-31T00:00:00","income":1200.5,"expenditure":1000}"#,
        )
        .expect("period");
        let snapshot = period.into_snapshot().expect("snapshot");
        assert_eq!(snapshot.period_end, NaiveDate::from_ymd_opt(2023, 3, 31).expect("date"));
        assert!((snapshot.net_income - 200.5).abs() < f64::EPSILON);

        let empty: FinancialPeriod =
            serde_json::from_str(r#"{"financial_period_end_date":"2023-03-31"}"#).expect("period");
        assert!(empty.into_snapshot().is_none());
    }
}
