// ABOUTME: Database error types for credential and report persistence
// ABOUTME: Structured variants with optional sqlx::Error conversion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Errors raised by the persistence layer
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Underlying driver error
    #[cfg(feature = "database-errors")]
    #[error("Database query failed: {source}")]
    Query {
        /// Driver error
        #[from]
        source: sqlx::Error,
    },

    /// Schema setup failed
    #[error("Migration failed for {table}: {reason}")]
    MigrationFailed {
        /// Table being created
        table: &'static str,
        /// Failure description
        reason: String,
    },

    /// Stored value could not be encrypted or decrypted
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Stored JSON document could not be (de)serialized
    #[error("Serialization failed for {context}")]
    Serialization {
        /// Column or document being processed
        context: &'static str,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A stored column holds a value outside its domain
    #[error("Invalid stored value for {field}: {reason}")]
    InvalidData {
        /// Column name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Connection could not be established
    #[error("Database connection failed: {0}")]
    Connection(String),
}
