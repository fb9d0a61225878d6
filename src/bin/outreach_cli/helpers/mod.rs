// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Helper modules for outreach-cli
// ABOUTME: Runtime context construction and output formatting

pub mod context;
pub mod display;
