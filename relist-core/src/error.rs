//! Error types for relist operations

use crate::ResourceKind;
use thiserror::Error;

/// Errors surfaced by the list/get transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },

    #[error("API server unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Timed out during {operation}")]
    Timeout { operation: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },
}

impl ClientError {
    /// True for the "item not found" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all relist errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelistError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl RelistError {
    /// True when this wraps a transport "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_not_found())
    }
}

/// Result type alias for relist operations.
pub type RelistResult<T> = Result<T, RelistError>;

// =============================================================================
// TESTS
// =============================================================================
