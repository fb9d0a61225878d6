// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Command modules for outreach-cli
// ABOUTME: Credential, report, and key management commands

pub mod credential;
pub mod key;
pub mod report;
