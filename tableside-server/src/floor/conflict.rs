//! Conflict Resolver
//!
//! Pure decision over `(action, actor, request, owner)`. The caller reads
//! `owner` under the roster lock that also guards the commit.

use shared::models::ServiceRequest;
use shared::{RequestAction, StaffRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Allow,
    /// Table belongs to someone else; the actor must choose
    NeedsConfirmation(StaffRef),
    Deny,
}

pub fn resolve(
    action: RequestAction,
    actor_id: i64,
    request: &ServiceRequest,
    owner: Option<&StaffRef>,
) -> Resolution {
    let owns_table = owner.is_some_and(|o| o.staff_id == actor_id);
    let is_assignee = request.assigned_staff_id == Some(actor_id);

    match action {
        RequestAction::Acknowledge => match owner {
            None => Resolution::Allow,
            Some(_) if owns_table => Resolution::Allow,
            Some(incumbent) => Resolution::NeedsConfirmation(incumbent.clone()),
        },
        RequestAction::Complete => {
            if is_assignee || owns_table {
                Resolution::Allow
            } else {
                Resolution::Deny
            }
        }
        RequestAction::Cancel => {
            if owner.is_none() || owns_table || is_assignee {
                Resolution::Allow
            } else {
                Resolution::Deny
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{RequestKind, RequestStatus};

    fn request(assignee: Option<i64>) -> ServiceRequest {
        ServiceRequest {
            id: 1,
            location_id: 1,
            table_id: 12,
            table_number: "12".to_string(),
            kind: RequestKind::Assistance,
            note: None,
            status: if assignee.is_some() {
                RequestStatus::InProgress
            } else {
                RequestStatus::Pending
            },
            created_at: 0,
            acknowledged_at: assignee.map(|_| 1),
            completed_at: None,
            cancelled_at: None,
            assigned_staff_id: assignee,
            assigned_staff_name: assignee.map(|id| format!("Staff {id}")),
        }
    }

    fn marco() -> StaffRef {
        StaffRef::new(2, "Marco")
    }

    #[test]
    fn acknowledge_on_unowned_or_own_table_is_allowed() {
        assert_eq!(
            resolve(RequestAction::Acknowledge, 1, &request(None), None),
            Resolution::Allow
        );
        assert_eq!(
            resolve(RequestAction::Acknowledge, 2, &request(None), Some(&marco())),
            Resolution::Allow
        );
    }

    #[test]
    fn acknowledge_on_foreign_table_needs_confirmation_never_deny() {
        assert_eq!(
            resolve(RequestAction::Acknowledge, 1, &request(None), Some(&marco())),
            Resolution::NeedsConfirmation(marco())
        );
    }

    #[test]
    fn complete_by_assignee_or_owner() {
        let in_progress = request(Some(1));
        assert_eq!(
            resolve(RequestAction::Complete, 1, &in_progress, Some(&marco())),
            Resolution::Allow
        );
        assert_eq!(
            resolve(RequestAction::Complete, 2, &in_progress, Some(&marco())),
            Resolution::Allow
        );
        assert_eq!(
            resolve(RequestAction::Complete, 3, &in_progress, Some(&marco())),
            Resolution::Deny
        );
        assert_eq!(
            resolve(RequestAction::Complete, 3, &in_progress, None),
            Resolution::Deny
        );
    }

    #[test]
    fn cancel_by_owner_or_on_unowned_table() {
        let pending = request(None);
        assert_eq!(
            resolve(RequestAction::Cancel, 3, &pending, None),
            Resolution::Allow
        );
        assert_eq!(
            resolve(RequestAction::Cancel, 2, &pending, Some(&marco())),
            Resolution::Allow
        );
        assert_eq!(
            resolve(RequestAction::Cancel, 3, &pending, Some(&marco())),
            Resolution::Deny
        );
    }
}
