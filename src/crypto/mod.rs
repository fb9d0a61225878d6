// ABOUTME: Cryptography module for credential protection at rest
// ABOUTME: Re-exports the token cipher and key generation helper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod tokens;

pub use tokens::{generate_encryption_key, TokenCipher};
