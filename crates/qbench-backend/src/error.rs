//! Backend error types.

use crate::BackendId;
use thiserror::Error;

/// Errors that can occur while a query service executes a query.
///
/// Every variant is attributed to the backend the call was made against, so a
/// failure can always be reported as "{backend} query failed: {reason}".
#[derive(Error, Debug)]
pub enum BackendError {
    /// Failed to reach the backend.
    #[error("Connection to {backend} failed: {message}")]
    ConnectionFailed { backend: BackendId, message: String },

    /// The backend rejected or failed to run the query.
    #[error("Execution failed on {backend}: {message}")]
    ExecutionFailed { backend: BackendId, message: String },

    /// The call did not resolve in time.
    #[error("Query on {backend} timed out")]
    Timeout { backend: BackendId },

    /// The backend answered with something that is not a query result.
    #[error("Invalid response from {backend}: {message}")]
    InvalidResponse { backend: BackendId, message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic backend error.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl BackendError {
    /// Create a connection failed error.
    pub fn connection_failed(backend: BackendId, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            backend,
            message: message.into(),
        }
    }

    /// Create an execution failed error.
    pub fn execution_failed(backend: BackendId, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            backend,
            message: message.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(backend: BackendId, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            backend,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// The underlying reason, verbatim where the backend supplied one.
    ///
    /// This is the string carried into a failed execution outcome; it leaves
    /// out the backend name since the outcome is already attributed.
    pub fn reason(&self) -> String {
        match self {
            BackendError::ConnectionFailed { message, .. }
            | BackendError::ExecutionFailed { message, .. }
            | BackendError::InvalidResponse { message, .. }
            | BackendError::ConfigurationError { message } => message.clone(),
            BackendError::Timeout { .. } => "timeout".to_string(),
            BackendError::Other(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_is_verbatim() {
        let err = BackendError::execution_failed(BackendId::Warehouse, "syntax error");
        assert_eq!(err.reason(), "syntax error");
        assert_eq!(err.to_string(), "Execution failed on warehouse: syntax error");
    }

    #[test]
    fn test_timeout_reason() {
        let err = BackendError::Timeout {
            backend: BackendId::Normalized,
        };
        assert_eq!(err.reason(), "timeout");
    }
}
