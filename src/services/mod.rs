// ABOUTME: Use-case layer composing extraction, registries, synthesis, CRM, and storage
// ABOUTME: Entry points shared by the operator CLI and library callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services own no transport concerns; they take typed requests and return
//! typed outcomes so any front end can drive them.

/// Outreach report generation pipeline
pub mod report_generation;

pub use report_generation::{
    GenerationOutcome, GenerationRequest, GenerationWarning, ReportGenerationService,
};
