// ABOUTME: External data sources feeding report synthesis
// ABOUTME: Website text extraction and nonprofit financial registries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Nonprofit financial registries
pub mod registry;
/// Website text extraction
pub mod website;

pub use registry::{
    FinancialRegistry, FinancialRegistryClient, UkCharityRegistry, UsNonprofitRegistry,
};
pub use website::{html_to_text, WebsiteExtractor, WebsiteExtractorConfig};
