// ABOUTME: Encryption key command for outreach-cli
// ABOUTME: Prints a fresh base64 key for OUTREACH_ENCRYPTION_KEY
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use outreach_core::errors::{AppResult, OutreachError};
use outreach_intel::config::environment::ENCRYPTION_KEY_ENV;
use outreach_intel::crypto::generate_encryption_key;

/// Generate and print a new key
pub fn generate() -> AppResult<()> {
    let key = generate_encryption_key().map_err(|e| OutreachError::persistence("generate key", e))?;
    println!("export {ENCRYPTION_KEY_ENV}=\"{key}\"");
    Ok(())
}
