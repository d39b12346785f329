//! Unified error handling for the pickup service
//!
//! A single [`Error`] enum spans the orchestration core. Request-level
//! failures (`InvalidRequest`, `NotFound`) are distinguished from
//! infrastructure failures (`ServiceCommunication`, `Storage`) and from the
//! one divergence the design tolerates: `PartialStatusUpdate`, raised when a
//! pickup record was already persisted or deleted but one or more remote
//! status mutations failed. The record's durability is never rolled back for
//! a partial update; reconciliation is owned by an out-of-scope process.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::status::StatusUpdateError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Request rejected by validation
    Validation,
    /// Referenced pickup does not exist
    NotFound,
    /// Sibling service unreachable or timed out
    Network,
    /// Persistence errors
    Storage,
    /// Configuration and startup errors
    Config,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the pickup service
#[derive(Error, Debug)]
pub enum Error {
    /// Creation or deletion request rejected by validation
    #[error("Invalid pickup request: {0}")]
    InvalidRequest(String),

    /// No pickup stored under the given id
    #[error("Pickup not found with ID: {0}")]
    NotFound(String),

    /// A sibling service could not be reached during validation
    #[error("Service communication failure: {0}")]
    ServiceCommunication(#[from] GatewayError),

    /// One or more status mutations failed after the record was
    /// persisted or deleted
    #[error("Partial status update failure: {0}")]
    PartialStatusUpdate(#[from] StatusUpdateError),

    /// Pickup store errors
    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create an invalid-request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a not-found error for a pickup id
    pub fn not_found(pickup_id: impl Into<String>) -> Self {
        Self::NotFound(pickup_id.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest(_) => ErrorCategory::Validation,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::ServiceCommunication(_) => ErrorCategory::Network,
            Self::PartialStatusUpdate(_) => ErrorCategory::Network,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidRequest(_) | Self::NotFound(_) | Self::Config(_) => false,
            // Transient by nature: the sibling service may come back
            Self::ServiceCommunication(_) | Self::PartialStatusUpdate(_) => true,
            Self::Storage(_) => false,
            Self::Other { .. } => false,
        }
    }
}

// Storage layer surfaces anyhow::Error (rusqlite wrapped with context)
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let err = Error::invalid_request("end before start");
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err = Error::not_found("P042");
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err = Error::ServiceCommunication(GatewayError::Timeout);
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(!Error::invalid_request("bad window").is_recoverable());
        assert!(Error::ServiceCommunication(GatewayError::Timeout).is_recoverable());
        assert!(!Error::config("missing url").is_recoverable());
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found("P042");
        assert_eq!(err.to_string(), "Pickup not found with ID: P042");
    }

    #[test]
    fn test_storage_conversion() {
        let err: Error = anyhow::anyhow!("disk full").into();
        assert_eq!(err.category(), ErrorCategory::Storage);
    }
}
