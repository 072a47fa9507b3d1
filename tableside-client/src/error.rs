//! Client error types

use shared::ErrorKind;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Business-rule failure reported by the action endpoint
    #[error("{kind}: {message}")]
    Api { kind: ErrorKind, message: String },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflicting state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Network failure: the server was never reached or never answered
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Classification shown to the operator
    pub fn kind(&self) -> ErrorKind {
        match self {
            _ if self.is_transport() => ErrorKind::Transport,
            Self::Api { kind, .. } => *kind,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::InvalidTransition,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Forbidden(_) => ErrorKind::NotOwner,
            Self::Unauthorized
            | Self::Http(_)
            | Self::InvalidResponse(_)
            | Self::Internal(_)
            | Self::Serialization(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_failures_keep_their_kind() {
        let err = ClientError::Api {
            kind: ErrorKind::InvalidTransition,
            message: "already acknowledged".into(),
        };
        assert!(!err.is_transport());
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(err.to_string(), "invalid_transition: already acknowledged");
    }

    #[test]
    fn status_errors_map_to_kinds() {
        assert_eq!(ClientError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(ClientError::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(ClientError::Unauthorized.kind(), ErrorKind::Internal);
    }
}
