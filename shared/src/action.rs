//! Request action protocol
//!
//! `POST /api/requests/action` carries one of three actions. Acknowledging a
//! request on a table owned by someone else does not fail: the server answers
//! with a [`ConfirmationPrompt`] and performs no mutation. The device then
//! re-submits the same action with `takeoverTable` set to the operator's
//! [`TakeoverChoice`].
//!
//! ```text
//! device                          server
//!   │ acknowledge(r)                 │
//!   │───────────────────────────────▶│ owner ≠ actor
//!   │◀─── needsConfirmation ─────────│ (no mutation)
//!   │ acknowledge(r, takeover=bool)  │
//!   │───────────────────────────────▶│ re-resolve, commit
//!   │◀─── success { request } ───────│
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
pub use crate::models::StaffRef;
use crate::models::ServiceRequest;

/// Staff action on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestAction {
    Acknowledge,
    Complete,
    Cancel,
}

impl RequestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acknowledge => "acknowledge",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

/// Operator's answer to a takeover prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakeoverChoice {
    /// Handle this request; table ownership is unchanged
    HandleOnly,
    /// Take over the whole table, then handle the request
    TakeoverTable,
}

impl TakeoverChoice {
    /// `takeoverTable` wire flag → choice (absent flag means no decision yet)
    pub fn from_flag(flag: Option<bool>) -> Option<Self> {
        flag.map(|takeover| {
            if takeover {
                Self::TakeoverTable
            } else {
                Self::HandleOnly
            }
        })
    }

    pub fn as_flag(&self) -> bool {
        matches!(self, Self::TakeoverTable)
    }
}

/// Action request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    pub request_id: i64,
    pub action: RequestAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub takeover_table: Option<bool>,
}

impl ActionPayload {
    pub fn new(request_id: i64, action: RequestAction) -> Self {
        Self {
            request_id,
            action,
            takeover_table: None,
        }
    }

    pub fn with_choice(mut self, choice: TakeoverChoice) -> Self {
        self.takeover_table = Some(choice.as_flag());
        self
    }

    pub fn choice(&self) -> Option<TakeoverChoice> {
        TakeoverChoice::from_flag(self.takeover_table)
    }
}

/// Ephemeral takeover decision, never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeoverDecision {
    pub request_id: i64,
    pub table_id: i64,
    pub incumbent: StaffRef,
    pub choice: TakeoverChoice,
}

/// `{ needsConfirmation: true, ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPrompt {
    pub needs_confirmation: bool,
    pub request_id: i64,
    pub table_id: i64,
    pub table_number: String,
    pub assigned_to: StaffRef,
}

impl ConfirmationPrompt {
    pub fn decide(&self, choice: TakeoverChoice) -> TakeoverDecision {
        TakeoverDecision {
            request_id: self.request_id,
            table_id: self.table_id,
            incumbent: self.assigned_to.clone(),
            choice,
        }
    }
}

/// `{ success: true, request }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSuccess {
    pub success: bool,
    pub request: ServiceRequest,
}

/// `{ success: false, error, message }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionFailure {
    pub success: bool,
    pub error: ErrorKind,
    #[serde(default)]
    pub message: String,
}

/// Response body of `POST /api/requests/action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    NeedsConfirmation(ConfirmationPrompt),
    Success(ActionSuccess),
    Failure(ActionFailure),
}

impl ActionOutcome {
    pub fn success(request: ServiceRequest) -> Self {
        Self::Success(ActionSuccess {
            success: true,
            request,
        })
    }

    pub fn needs_confirmation(
        request_id: i64,
        table_id: i64,
        table_number: impl Into<String>,
        assigned_to: StaffRef,
    ) -> Self {
        Self::NeedsConfirmation(ConfirmationPrompt {
            needs_confirmation: true,
            request_id,
            table_id,
            table_number: table_number.into(),
            assigned_to,
        })
    }

    pub fn failure(error: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure(ActionFailure {
            success: false,
            error,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn request(&self) -> Option<&ServiceRequest> {
        match self {
            Self::Success(s) => Some(&s.request),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failure(f) => Some(f.error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_reads_source_wire_format() {
        let payload: ActionPayload = serde_json::from_str(
            r#"{"requestId": 5, "action": "acknowledge", "takeoverTable": true}"#,
        )
        .unwrap();
        assert_eq!(payload.request_id, 5);
        assert_eq!(payload.action, RequestAction::Acknowledge);
        assert_eq!(payload.choice(), Some(TakeoverChoice::TakeoverTable));

        let first_round: ActionPayload =
            serde_json::from_str(r#"{"requestId": 5, "action": "cancel"}"#).unwrap();
        assert_eq!(first_round.choice(), None);
    }

    #[test]
    fn confirmation_prompt_shape() {
        let outcome = ActionOutcome::needs_confirmation(5, 12, "12", StaffRef::new(2, "Marco"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["needsConfirmation"], true);
        assert_eq!(json["tableNumber"], "12");
        assert_eq!(json["assignedTo"]["staffId"], 2);
        assert_eq!(json["assignedTo"]["name"], "Marco");
    }

    #[test]
    fn untagged_outcome_picks_the_right_variant() {
        let failure = ActionOutcome::failure(ErrorKind::InvalidTransition, "already acknowledged");
        let json = serde_json::to_string(&failure).unwrap();
        let back: ActionOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back.error_kind(), Some(ErrorKind::InvalidTransition));

        let prompt = ActionOutcome::needs_confirmation(1, 2, "2", StaffRef::new(3, "Ana"));
        let json = serde_json::to_string(&prompt).unwrap();
        let back: ActionOutcome = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, ActionOutcome::NeedsConfirmation(_)));
    }

    #[test]
    fn prompt_decision_keeps_incumbent() {
        let ActionOutcome::NeedsConfirmation(prompt) =
            ActionOutcome::needs_confirmation(1, 2, "2", StaffRef::new(3, "Ana"))
        else {
            unreachable!()
        };
        let decision = prompt.decide(TakeoverChoice::HandleOnly);
        assert_eq!(decision.incumbent.staff_id, 3);
        assert_eq!(decision.choice, TakeoverChoice::HandleOnly);
    }
}
