// ABOUTME: CRM platform constants
// ABOUTME: OAuth token endpoint, API base URL, API version header, default namespace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// OAuth token endpoint (code exchange and refresh)
pub const TOKEN_URL: &str = "https://services.leadconnectorhq.com/oauth/token";

/// Resource API base URL
pub const API_BASE_URL: &str = "https://services.leadconnectorhq.com";

/// Name of the API version header required on every resource call
pub const VERSION_HEADER: &str = "Version";

/// API version sent in [`VERSION_HEADER`]
pub const API_VERSION: &str = "2021-07-28";

/// Namespace used when a caller does not name one
pub const DEFAULT_NAMESPACE: &str = "crm";

/// Token lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 86_400;

/// Page size for contact searches
pub const DEFAULT_CONTACT_SEARCH_LIMIT: u32 = 20;

/// Authorization page where a user picks the location to connect
pub const AUTHORIZATION_URL: &str = "https://marketplace.gohighlevel.com/oauth/chooselocation";

/// Scopes requested when connecting
pub const DEFAULT_SCOPES: &[&str] = &[
    "contacts.readonly",
    "contacts.write",
    "opportunities.readonly",
    "opportunities.write",
    "locations/customFields.readonly",
];
