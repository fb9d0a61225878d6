// ABOUTME: CRM platform integration
// ABOUTME: Resource API client and its typed request/response models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Authenticated resource API client
pub mod client;
/// Request and response shapes
pub mod models;

pub use client::{CrmClient, CrmClientConfig};
pub use models::{
    Contact, ContactUpdate, CustomField, NewContact, NewOpportunity, Note, Opportunity,
    OpportunityContact, Pipeline, PipelineStage,
};
