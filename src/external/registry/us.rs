// ABOUTME: US nonprofit filings client backed by ProPublica Nonprofit Explorer
// ABOUTME: Reads Form 990 revenue and expenses by EIN
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use outreach_core::constants::registry;
use outreach_core::errors::{OutreachError, OutreachResult};
use outreach_core::models::{FinancialSnapshot, RegistryCountry};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{fetch_json, FinancialRegistry};
use crate::utils::http_client::shared_client;

/// ProPublica Nonprofit Explorer API client
pub struct UsNonprofitRegistry {
    base_url: String,
    http: Client,
}

impl UsNonprofitRegistry {
    /// Create a client for the API at `base_url`
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: shared_client().clone(),
        }
    }
}

#[async_trait]
impl FinancialRegistry for UsNonprofitRegistry {
    fn name(&self) -> &'static str {
        registry::US_REGISTRY_NAME
    }

    fn country(&self) -> RegistryCountry {
        RegistryCountry::Us
    }

    #[instrument(skip(self))]
    async fn fetch_filings(&self, identifier: &str) -> OutreachResult<Vec<FinancialSnapshot>> {
        let ein = normalize_ein(identifier)?;
        let url = format!(
            "{}/organizations/{ein}.json",
            self.base_url.trim_end_matches('/')
        );

        let Some(organization) =
            fetch_json::<OrganizationResponse>(self.name(), self.http.get(url)).await?
        else {
            return Ok(Vec::new());
        };

        let total = organization.filings_with_data.len();
        let snapshots: Vec<FinancialSnapshot> = organization
            .filings_with_data
            .into_iter()
            .filter_map(Filing::into_snapshot)
            .collect();
        debug!(filings = total, usable = snapshots.len(), "Nonprofit filings received");
        Ok(snapshots)
    }
}

/// Strip formatting from an EIN; nine digits must remain
fn normalize_ein(identifier: &str) -> OutreachResult<String> {
    let digits: String = identifier.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 9 {
        Ok(digits)
    } else {
        Err(OutreachError::InvalidInput(format!(
            "EIN must have 9 digits: {identifier}"
        )))
    }
}

#[derive(Deserialize)]
struct OrganizationResponse {
    #[serde(default)]
    filings_with_data: Vec<Filing>,
}

#[derive(Deserialize)]
struct Filing {
    tax_prd: Option<u32>,
    totrevenue: Option<f64>,
    totfuncexpns: Option<f64>,
}

impl Filing {
    fn into_snapshot(self) -> Option<FinancialSnapshot> {
        let period_end = month_end(self.tax_prd?)?;
        if self.totrevenue.is_none() && self.totfuncexpns.is_none() {
            return None;
        }
        Some(FinancialSnapshot::new(
            period_end,
            self.totrevenue.unwrap_or_default(),
            self.totfuncexpns.unwrap_or_default(),
        ))
    }
}

/// Last day of the month encoded as `YYYYMM`
fn month_end(tax_period: u32) -> Option<NaiveDate> {
    let year = i32::try_from(tax_period / 100).ok()?;
    let month = tax_period % 100;
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}
