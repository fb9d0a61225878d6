// ABOUTME: Core types and constants for the outreach intelligence pipeline
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Outreach Core
//!
//! Foundation crate providing shared types and constants for the outreach
//! intelligence pipeline. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: `AppError`/`ErrorCode` plus the pipeline's `OutreachError` taxonomy
//! - **models**: Integration credentials, financial snapshots, and outreach reports
//! - **constants**: CRM, registry, and pipeline defaults

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (credentials, financial snapshots, reports)
pub mod models;
