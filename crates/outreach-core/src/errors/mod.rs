// ABOUTME: Unified error handling for the outreach intelligence pipeline
// ABOUTME: Re-exports AppError, ErrorCode, DatabaseError, and the OutreachError taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Two layers of errors live here:
//!
//! - [`OutreachError`] is the pipeline taxonomy. Each component returns it so a
//!   caller can tell a missing integration apart from a rejected refresh, a failed
//!   website fetch, or unparseable generation output.
//! - [`AppError`] with an [`ErrorCode`] is the general error used by the LLM
//!   providers, configuration loading, and the CLI surface. Every
//!   `OutreachError` converts into an `AppError` without losing its code.

mod app;
mod database;
mod outreach;

pub use app::{AppError, AppResult, ErrorCode};
pub use database::DatabaseError;
pub use outreach::{OutreachError, OutreachResult};
