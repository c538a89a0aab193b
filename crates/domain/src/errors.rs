//! Error types used throughout the client and reconciler

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error classes, one per failure domain of a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or contradictory client configuration - detected before any call
    Configuration,
    /// Identity-token retrieval failed
    Authentication,
    /// Connect/DNS/timeout failures and every non-200 response
    Transport,
    /// Outbound payload could not be encoded
    Serialization,
    /// Backend returned a body that does not match the declared shape
    Deserialization,
    /// Caller handed over a value the wire contract cannot carry
    Input,
    /// Invariant violated inside the client itself
    Internal,
}

/// Main error type for proxyplane
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ProxyPlaneError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("bad status code {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyPlaneError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Network(_) | Self::Status { .. } => ErrorCategory::Transport,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Deserialization(_) => ErrorCategory::Deserialization,
            Self::InvalidInput(_) => ErrorCategory::Input,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// True when the backend answered 404.
    ///
    /// Callers of `get_instance` treat *any* error as "not found"; this only
    /// distinguishes the explicit case for logging.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Stable label suitable for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Auth(_) => "auth",
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::Serialization(_) => "serialization",
            Self::Deserialization(_) => "deserialization",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for proxyplane operations
pub type Result<T> = std::result::Result<T, ProxyPlaneError>;
