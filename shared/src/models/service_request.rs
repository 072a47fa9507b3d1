//! Service Request Model (服务请求)

use serde::{Deserialize, Serialize};

/// What the guest asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    CallWaiter,
    RequestBill,
    Assistance,
    Other,
}

/// Lifecycle status
///
/// ```text
/// Pending ──acknowledge──▶ InProgress ──complete──▶ Completed
///    │
///    └──cancel──▶ Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// Completed and Cancelled accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Statuses that carry an assigned staff member
    pub fn has_assignee(&self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }

    /// Wire name, also used in `?status=` queries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Guest-initiated service call bound to a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: i64,
    pub location_id: i64,
    pub table_id: i64,
    /// Display label of the table at creation time
    pub table_number: String,
    pub kind: RequestKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: RequestStatus,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    /// Staff currently handling it (set on acknowledge)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff_name: Option<String>,
}

impl ServiceRequest {
    /// `assignedStaffId` is set iff status is InProgress/Completed, and
    /// `acknowledgedAt` is set iff `assignedStaffId` is set.
    pub fn is_consistent(&self) -> bool {
        self.assigned_staff_id.is_some() == self.status.has_assignee()
            && self.acknowledged_at.is_some() == self.assigned_staff_id.is_some()
    }
}

/// Create request payload (guest channel ingress)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestCreate {
    pub location_id: i64,
    pub table_id: i64,
    pub kind: RequestKind,
    pub note: Option<String>,
}

/// List filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    /// Requests assigned to this staff member or on tables they own
    pub only_staff_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> ServiceRequest {
        ServiceRequest {
            id: 1,
            location_id: 10,
            table_id: 7,
            table_number: "7".to_string(),
            kind: RequestKind::CallWaiter,
            note: None,
            status: RequestStatus::Pending,
            created_at: 1_000,
            acknowledged_at: None,
            completed_at: None,
            cancelled_at: None,
            assigned_staff_id: None,
            assigned_staff_name: None,
        }
    }

    #[test]
    fn wire_format_is_camel_case_with_snake_case_enums() {
        let json = serde_json::to_value(pending()).unwrap();
        assert_eq!(json["tableId"], 7);
        assert_eq!(json["kind"], "call_waiter");
        assert_eq!(json["status"], "pending");
        assert!(json.get("assignedStaffId").is_none());
    }

    #[test]
    fn consistency_tracks_assignee() {
        let mut req = pending();
        assert!(req.is_consistent());

        req.status = RequestStatus::InProgress;
        assert!(!req.is_consistent());

        req.assigned_staff_id = Some(3);
        req.acknowledged_at = Some(2_000);
        assert!(req.is_consistent());
    }

    #[test]
    fn terminal_statuses() {
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
        assert!(!RequestStatus::InProgress.is_terminal());
    }

    #[test]
    fn status_name_matches_serde() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::from(status.as_str())
            );
        }
    }
}
