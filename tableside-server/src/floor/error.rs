use shared::models::{RequestStatus, StaffRef};
use shared::{ErrorKind, RequestAction};
use thiserror::Error;

use super::storage::StorageError;

/// Engine errors
///
/// None of these are fatal: a failed action leaves state unchanged and the
/// device sees the authoritative state on its next poll.
#[derive(Debug, Error)]
pub enum FloorError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Request not found: {0}")]
    RequestNotFound(i64),

    #[error("Assignment not found: {0}")]
    AssignmentNotFound(i64),

    #[error("Table {table_id} not found at location {location_id}")]
    TableNotFound { location_id: i64, table_id: i64 },

    #[error("Section {section_id} not found at location {location_id}")]
    SectionNotFound { location_id: i64, section_id: i64 },

    #[error("Cannot {} a {:?} request", .action.as_str(), .from)]
    InvalidTransition {
        from: RequestStatus,
        action: RequestAction,
    },

    #[error("Request {request_id} belongs to another staff member's table")]
    NotOwner { request_id: i64 },

    #[error("Already assigned to {}", .incumbent.name)]
    OwnershipConflict { incumbent: StaffRef },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl FloorError {
    /// Wire classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) => ErrorKind::Internal,
            Self::RequestNotFound(_) | Self::AssignmentNotFound(_) | Self::TableNotFound { .. }
            | Self::SectionNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::NotOwner { .. } => ErrorKind::NotOwner,
            Self::OwnershipConflict { .. } => ErrorKind::OwnershipConflict,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }
}

pub type FloorResult<T> = Result<T, FloorError>;
