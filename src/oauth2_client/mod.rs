// ABOUTME: OAuth 2.0 client side of the CRM integration
// ABOUTME: Token endpoint exchanges and the token lifecycle manager built on them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Token endpoint client
pub mod client;
/// Valid-token guarantee with serialized refresh
pub mod token_manager;

pub use client::{OAuth2Client, OAuth2Config, OAuth2Token, TokenExchangeError};
pub use token_manager::{ConnectionStatus, TokenLifecycleManager};
