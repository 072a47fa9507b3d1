//! Takeover prompt on the device
//!
//! Acknowledging a request on someone else's table returns a
//! [`TakeoverPrompt`]. The operator answers with a [`TakeoverChoice`] and the
//! same acknowledge is re-submitted with `takeoverTable` set.

use shared::action::ConfirmationPrompt;
use shared::models::ServiceRequest;
use shared::{ActionOutcome, ActionPayload, RequestAction, StaffRef, TakeoverChoice};

use crate::{ClientError, ClientResult};

/// Pending operator decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeoverPrompt {
    pub request_id: i64,
    pub table_id: i64,
    pub table_number: String,
    /// Current table owner
    pub assigned_to: StaffRef,
}

impl TakeoverPrompt {
    /// Dialog text, e.g. "Table 12 is assigned to Marco"
    pub fn message(&self) -> String {
        format!(
            "Table {} is assigned to {}",
            self.table_number, self.assigned_to.name
        )
    }

    /// Re-submission carrying the operator's answer
    pub fn payload(&self, choice: TakeoverChoice) -> ActionPayload {
        ActionPayload::new(self.request_id, RequestAction::Acknowledge).with_choice(choice)
    }
}

impl From<ConfirmationPrompt> for TakeoverPrompt {
    fn from(prompt: ConfirmationPrompt) -> Self {
        Self {
            request_id: prompt.request_id,
            table_id: prompt.table_id,
            table_number: prompt.table_number,
            assigned_to: prompt.assigned_to,
        }
    }
}

/// Typed result of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActResult {
    Done(ServiceRequest),
    /// Ask the operator, then call `resolve_prompt`
    Confirm(TakeoverPrompt),
}

impl TryFrom<ActionOutcome> for ActResult {
    type Error = ClientError;

    fn try_from(outcome: ActionOutcome) -> ClientResult<Self> {
        match outcome {
            ActionOutcome::Success(success) => Ok(Self::Done(success.request)),
            ActionOutcome::NeedsConfirmation(prompt) => Ok(Self::Confirm(prompt.into())),
            ActionOutcome::Failure(failure) => Err(ClientError::Api {
                kind: failure.error,
                message: failure.message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorKind;

    fn prompt() -> TakeoverPrompt {
        let ActionOutcome::NeedsConfirmation(p) =
            ActionOutcome::needs_confirmation(5, 12, "12", StaffRef::new(2, "Marco"))
        else {
            unreachable!()
        };
        p.into()
    }

    #[test]
    fn prompt_text_names_the_owner() {
        assert_eq!(prompt().message(), "Table 12 is assigned to Marco");
    }

    #[test]
    fn answers_become_takeover_flags() {
        let handle = prompt().payload(TakeoverChoice::HandleOnly);
        assert_eq!(handle.request_id, 5);
        assert_eq!(handle.action, RequestAction::Acknowledge);
        assert_eq!(handle.takeover_table, Some(false));

        let takeover = prompt().payload(TakeoverChoice::TakeoverTable);
        assert_eq!(takeover.takeover_table, Some(true));
    }

    #[test]
    fn failure_outcome_is_an_error() {
        let outcome = ActionOutcome::failure(ErrorKind::NotOwner, "not yours");
        let err = ActResult::try_from(outcome).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
    }

    #[test]
    fn confirmation_outcome_becomes_prompt() {
        let outcome = ActionOutcome::needs_confirmation(5, 12, "12", StaffRef::new(2, "Marco"));
        assert_eq!(ActResult::try_from(outcome).unwrap(), ActResult::Confirm(prompt()));
    }
}
