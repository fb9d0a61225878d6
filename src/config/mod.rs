// ABOUTME: Configuration module for the outreach intelligence pipeline
// ABOUTME: Environment-driven settings and shared configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment variable loading
pub mod environment;
/// Shared configuration enums
pub mod types;

pub use environment::{
    CrmConfig, DatabaseConfig, ExtractionConfig, LlmConfig, OutreachConfig, RegistryConfig,
};
pub use types::{Environment, LlmProviderType};
