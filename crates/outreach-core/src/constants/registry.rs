// ABOUTME: Nonprofit registry constants
// ABOUTME: UK Charity Commission and US ProPublica endpoints and auth header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// UK Charity Commission register API base
pub const UK_API_BASE_URL: &str = "https://api.charitycommission.gov.uk/register/api";

/// Subscription key header for the UK register
pub const UK_SUBSCRIPTION_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Display name of the UK registry
pub const UK_REGISTRY_NAME: &str = "Charity Commission";

/// US ProPublica Nonprofit Explorer API base
pub const US_API_BASE_URL: &str = "https://projects.propublica.org/nonprofits/api/v2";

/// Display name of the US registry
pub const US_REGISTRY_NAME: &str = "ProPublica Nonprofit Explorer";
