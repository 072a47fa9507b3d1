//! Error kinds surfaced to staff devices
//!
//! Business-rule failures are recovered on the device by re-fetching or by
//! asking the operator; only [`ErrorKind::Transport`] is retried, and only on
//! the regular polling cadence.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure classification carried in `{ success: false, error }` bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Action not permitted from the request's current status
    InvalidTransition,
    /// A grant would overwrite another staff member's binding
    OwnershipConflict,
    /// Neither the assignee nor the current table owner
    NotOwner,
    /// Request, table or assignment no longer exists
    NotFound,
    /// Malformed input
    Validation,
    /// Storage or other server-side failure
    Internal,
    /// Network/connection failure (client side only)
    Transport,
}

impl ErrorKind {
    /// HTTP status used when this kind is returned by the server
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidTransition => StatusCode::CONFLICT,
            Self::OwnershipConflict | Self::NotOwner => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Transport => StatusCode::BAD_GATEWAY,
        }
    }

    /// Whether the device should re-fetch state before trying again
    pub fn requires_refetch(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition | Self::NotFound | Self::OwnershipConflict
        )
    }

    /// Whether the failure is retried automatically (on the next poll tick)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidTransition => "invalid_transition",
            Self::OwnershipConflict => "ownership_conflict",
            Self::NotOwner => "not_owner",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Transport => "transport",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
