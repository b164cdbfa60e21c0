//! Error types for the Board client.

use thiserror::Error;

/// A shared error type for the entire Board client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// HTTP error response from the backend
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Network-level failure (backend unreachable, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication expired or rejected (401)
    ///
    /// The client continues in guest mode after clearing the stored token;
    /// this variant exists so callers can tell the demotion happened.
    #[error("Authentication expired")]
    Unauthorized,

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Realtime channel error (connect, frame, protocol)
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Local storage error (token store, fallback history)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an Http error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Realtime error
    pub fn realtime(message: impl Into<String>) -> Self {
        Self::Realtime(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is the 401 guest-mode demotion
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Check if this error means the backend could not be reached at all.
    ///
    /// Used by callers that fall back to local data (default persona catalog,
    /// local conversation history) when the backend is unavailable.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<std::io::Error> for BoardError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for BoardError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            Self::Serialization {
                format: "JSON".to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// A type alias for `Result<T, BoardError>`.
pub type Result<T> = std::result::Result<T, BoardError>;
