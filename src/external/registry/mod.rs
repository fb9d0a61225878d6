// ABOUTME: Country-polymorphic nonprofit financial registry client
// ABOUTME: One trait per registry, a facade that degrades failures to "no data"
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Financial Registries
//!
//! Each supported country has one [`FinancialRegistry`] implementation that
//! talks to its registry and normalizes filings into [`FinancialSnapshot`]s.
//! [`FinancialRegistryClient`] routes by [`RegistryCountry`] and turns every
//! failure into `None`, since financials only enrich a report.

mod uk;
mod us;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use outreach_core::errors::{OutreachError, OutreachResult};
use outreach_core::models::{sort_latest_first, FinancialSnapshot, RegistryCountry};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

pub use uk::UkCharityRegistry;
pub use us::UsNonprofitRegistry;

use crate::config::RegistryConfig;
use crate::logging::AppLogger;

/// A registry of nonprofit financial filings for one country
#[async_trait]
pub trait FinancialRegistry: Send + Sync {
    /// Display name used in logs and errors
    fn name(&self) -> &'static str;

    /// Country this registry covers
    fn country(&self) -> RegistryCountry;

    /// Fetch all filings for `identifier`, in any order
    ///
    /// An organization the registry does not know yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed identifier and
    /// `RegistryUnavailable` for transport, status, or parse failures
    async fn fetch_filings(&self, identifier: &str) -> OutreachResult<Vec<FinancialSnapshot>>;
}

/// Routes lookups to the registry of the requested country
#[derive(Clone, Default)]
pub struct FinancialRegistryClient {
    registries: HashMap<RegistryCountry, Arc<dyn FinancialRegistry>>,
}

impl FinancialRegistryClient {
    /// Create a client with no registries
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client with every registry the configuration enables
    ///
    /// The UK registry requires a subscription key and is skipped without one.
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        let mut client = Self::new();
        client.register(Arc::new(UsNonprofitRegistry::new(config.us_base_url.clone())));
        match &config.uk_api_key {
            Some(api_key) => client.register(Arc::new(UkCharityRegistry::new(
                config.uk_base_url.clone(),
                api_key.clone(),
            ))),
            None => debug!("UK registry disabled: no subscription key configured"),
        }
        client
    }

    /// Add or replace the registry for its country
    pub fn register(&mut self, registry: Arc<dyn FinancialRegistry>) {
        self.registries.insert(registry.country(), registry);
    }

    /// Whether a registry is configured for `country`
    #[must_use]
    pub fn supports(&self, country: RegistryCountry) -> bool {
        self.registries.contains_key(&country)
    }

    /// Fetch financial snapshots, latest period first
    ///
    /// Returns `None` when the identifier is blank, the country has no
    /// registry, the registry has no data, or the lookup fails. Failures are
    /// logged and never propagated.
    #[instrument(skip(self), fields(registry.country = %country))]
    pub async fn fetch_financials(
        &self,
        country: RegistryCountry,
        identifier: &str,
    ) -> Option<Vec<FinancialSnapshot>> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }

        let Some(registry) = self.registries.get(&country) else {
            debug!("No registry configured for country");
            return None;
        };

        match registry.fetch_filings(identifier).await {
            Ok(mut snapshots) if !snapshots.is_empty() => {
                sort_latest_first(&mut snapshots);
                AppLogger::log_registry_lookup(country.as_str(), identifier, Some(snapshots.len()));
                Some(snapshots)
            }
            Ok(_) => {
                AppLogger::log_registry_lookup(country.as_str(), identifier, None);
                None
            }
            Err(error) => {
                warn!(registry = registry.name(), error = %error, "Financial lookup failed");
                None
            }
        }
    }
}

/// Send a registry request and decode its JSON body
///
/// A 404 means the organization is unknown and yields `Ok(None)`.
pub(super) async fn fetch_json<T: DeserializeOwned>(
    registry: &'static str,
    request: RequestBuilder,
) -> OutreachResult<Option<T>> {
    let unavailable = |reason: String| OutreachError::RegistryUnavailable { registry, reason };

    let response = request
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(unavailable(format!("HTTP {status}")));
    }

    response
        .json::<T>()
        .await
        .map(Some)
        .map_err(|e| unavailable(format!("invalid response body: {e}")))
}
