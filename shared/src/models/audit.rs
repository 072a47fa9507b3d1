//! Audit trail entries
//!
//! Every request transition and every assignment mutation is recorded with
//! the acting staff member and a timestamp.

use serde::{Deserialize, Serialize};

/// What was audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum AuditSubject {
    Request(i64),
    Assignment(i64),
}

impl AuditSubject {
    /// Storage key prefix, e.g. `request:42`
    pub fn key(&self) -> String {
        match self {
            Self::Request(id) => format!("request:{id}"),
            Self::Assignment(id) => format!("assignment:{id}"),
        }
    }
}

/// Audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    RequestCreated,
    RequestAcknowledged,
    RequestCompleted,
    RequestCancelled,
    AssignmentGranted,
    AssignmentSuperseded,
    AssignmentRevoked,
    AssignmentExpired,
}

/// Append-only audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub sequence: u64,
    pub at: i64,
    pub subject: AuditSubject,
    pub action: AuditAction,
    /// None for system actions (rollover)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub detail: serde_json::Value,
}
