// ABOUTME: Core data models for the outreach intelligence pipeline
// ABOUTME: Re-exports credential, financial snapshot, and report types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `IntegrationCredential`: OAuth credential for one (user, namespace) CRM connection
//! - `FinancialSnapshot`: one filing period of a nonprofit's financials
//! - `OutreachReport`: generated outreach content for one (user, contact) pair

mod credential;
mod financial;
mod report;

pub use credential::{IntegrationCredential, ValidToken};
pub use financial::{sort_latest_first, FinancialSnapshot, RegistryCountry};
pub use report::{OutreachReport, ReportContent, ReportContentPatch};
