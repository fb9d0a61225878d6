// ABOUTME: Utility modules shared across the pipeline
// ABOUTME: Currently the shared HTTP client configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// HTTP client configuration and helpers
pub mod http_client;
