// ABOUTME: Error taxonomy of the outreach intelligence pipeline
// ABOUTME: Credential, fetch, registry, generation, and persistence failures with error codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use uuid::Uuid;

use super::app::{AppError, ErrorCode};
use super::database::DatabaseError;

/// Failures surfaced by pipeline components
///
/// Credential-path errors (`IntegrationNotConnected`, `RefreshTokenMissing`,
/// `RefreshFailed`) are fatal for any CRM call. `RegistryUnavailable` is the only
/// variant the pipeline routinely degrades instead of propagating.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum OutreachError {
    /// No credential row exists for the (user, namespace) pair
    #[error("No '{namespace}' integration connected for user {user_id}")]
    IntegrationNotConnected {
        /// Owning user
        user_id: Uuid,
        /// Integration namespace
        namespace: String,
    },

    /// The access token expired and no refresh token is stored
    #[error("Credential '{namespace}' for user {user_id} expired and has no refresh token")]
    RefreshTokenMissing {
        /// Owning user
        user_id: Uuid,
        /// Integration namespace
        namespace: String,
    },

    /// The token endpoint rejected or failed the refresh exchange
    #[error("Token refresh for '{namespace}' failed: {reason}")]
    RefreshFailed {
        /// Integration namespace
        namespace: String,
        /// HTTP status returned by the token endpoint, if any
        status: Option<u16>,
        /// Failure description
        reason: String,
    },

    /// Website content could not be fetched
    #[error("Failed to fetch {url}: {reason}")]
    FetchError {
        /// Requested URL
        url: String,
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Failure description
        reason: String,
    },

    /// A financial registry could not be queried or its response parsed
    #[error("{registry} registry unavailable: {reason}")]
    RegistryUnavailable {
        /// Registry display name
        registry: &'static str,
        /// Failure description
        reason: String,
    },

    /// The AI service answered but the answer does not have the report shape
    #[error("Generation output is malformed: {reason}")]
    MalformedGenerationOutput {
        /// What failed validation
        reason: String,
        /// Verbatim model output
        raw: String,
    },

    /// The AI service call itself failed
    #[error("Generation service '{provider}' failed: {source}")]
    GenerationFailed {
        /// Provider name
        provider: String,
        /// Provider error
        #[source]
        source: AppError,
    },

    /// Merge-update targeted a report that was never stored
    #[error("No report stored for user {user_id} and contact {contact_id}")]
    ReportNotFound {
        /// Owning user
        user_id: Uuid,
        /// CRM contact id
        contact_id: String,
    },

    /// A local persistence operation failed
    #[error("Persistence failed during {operation}: {source}")]
    PersistenceError {
        /// Operation being performed
        operation: &'static str,
        /// Underlying database error
        #[source]
        source: DatabaseError,
    },

    /// The CRM resource API rejected a call
    #[error("CRM request {endpoint} failed: {message}")]
    CrmRequestFailed {
        /// Endpoint path
        endpoint: String,
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Failure description
        message: String,
    },

    /// Caller supplied invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl OutreachError {
    /// Wrap a database error with the operation that produced it
    #[must_use]
    pub const fn persistence(operation: &'static str, source: DatabaseError) -> Self {
        Self::PersistenceError { operation, source }
    }

    /// Error code for this failure
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::IntegrationNotConnected { .. } => ErrorCode::AuthRequired,
            Self::RefreshTokenMissing { .. } => ErrorCode::AuthExpired,
            Self::RefreshFailed { .. } => ErrorCode::ExternalAuthFailed,
            Self::FetchError { .. } | Self::RegistryUnavailable { .. } => {
                ErrorCode::ExternalServiceUnavailable
            }
            Self::MalformedGenerationOutput { .. } => ErrorCode::InvalidFormat,
            Self::GenerationFailed { source, .. } => source.code,
            Self::ReportNotFound { .. } => ErrorCode::ResourceNotFound,
            Self::PersistenceError { .. } => ErrorCode::DatabaseError,
            Self::CrmRequestFailed { .. } => ErrorCode::ExternalServiceError,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
        }
    }

    /// Whether this error originates from the credential path
    #[must_use]
    pub const fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::IntegrationNotConnected { .. }
                | Self::RefreshTokenMissing { .. }
                | Self::RefreshFailed { .. }
        )
    }
}

impl From<OutreachError> for AppError {
    fn from(error: OutreachError) -> Self {
        let code = error.code();
        let message = error.to_string();
        Self::new(code, message).with_source(error)
    }
}

/// Result alias for pipeline operations
pub type OutreachResult<T> = Result<T, OutreachError>;
