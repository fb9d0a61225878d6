// ABOUTME: Main library entry point for the outreach intelligence pipeline
// ABOUTME: CRM token lifecycle, research enrichment, LLM synthesis, templating, and storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Outreach Intelligence
//!
//! Builds a personalized outreach report for one CRM contact:
//!
//! - **Token lifecycle**: keeps the CRM integration's OAuth token valid,
//!   serializing refreshes per (user, namespace)
//! - **Enrichment**: website text and nonprofit registry financials (UK/US)
//! - **Synthesis**: one LLM call per report, parsed into typed fields
//! - **Templating**: deterministic `[First Name]`/`[Your Name]` substitution
//! - **Storage**: upsert and partial merge keyed by (user, contact)
//!
//! ## Architecture
//!
//! - **`oauth2_client`**: token endpoint client and token lifecycle manager
//! - **`crm`**: typed CRM resource client
//! - **`external`**: website extractor and financial registries
//! - **`llm`**: provider abstraction (Gemini, `OpenAI`-compatible)
//! - **`intelligence`**: prompts, output parser, synthesizer, templater
//! - **`database`**: `SQLite` persistence for credentials and reports
//! - **`services`**: the report generation use case
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use outreach_intel::config::OutreachConfig;
//! use outreach_core::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = OutreachConfig::from_env()?;
//!     println!("{}", config.summary());
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the CLI binary (src/bin/) and integration tests (tests/).

/// Environment configuration
pub mod config;

/// Typed CRM resource client
pub mod crm;

/// Token encryption at rest
pub mod crypto;

/// `SQLite` persistence for credentials and reports
pub mod database;

/// Website extraction and financial registries
pub mod external;

/// Report prompts, output parsing, synthesis, and templating
pub mod intelligence;

/// LLM provider abstraction
pub mod llm;

/// Structured logging setup and domain log helpers
pub mod logging;

/// CRM OAuth token endpoint client and token lifecycle manager
pub mod oauth2_client;

/// Report generation use case
pub mod services;

/// Shared HTTP clients
pub mod utils;
