//! Takeover Negotiator (server side)
//!
//! ```text
//! 1. acknowledge(r)                 → Prompt(incumbent), nothing written
//! 2. operator: HandleOnly | TakeoverTable
//! 3. acknowledge(r, takeover=bool)  → ownership re-resolved, then:
//!      HandleOnly     request → InProgress, roster untouched
//!      TakeoverTable  table binding → actor, request → InProgress (one commit)
//! ```
//!
//! Step 3 never trusts the state seen in step 1. If the table became free or
//! the actor's own in between, the choice is moot and the action simply runs.

use shared::{StaffRef, TakeoverChoice};

use super::conflict::Resolution;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Ask the operator; no mutation
    Prompt(StaffRef),
    /// Commit the action, claiming the table first when set
    Proceed { claim_table: bool },
    Reject,
}

/// Combine the resolver's verdict with the operator's (optional) choice
pub fn settle(
    resolution: Resolution,
    choice: Option<TakeoverChoice>,
    owner: Option<&StaffRef>,
) -> Settlement {
    match (resolution, choice) {
        (Resolution::Deny, _) => Settlement::Reject,
        (Resolution::NeedsConfirmation(incumbent), None) => Settlement::Prompt(incumbent),
        (Resolution::NeedsConfirmation(_), Some(TakeoverChoice::HandleOnly)) => {
            Settlement::Proceed { claim_table: false }
        }
        (Resolution::NeedsConfirmation(_), Some(TakeoverChoice::TakeoverTable)) => {
            Settlement::Proceed { claim_table: true }
        }
        // actor already owns the table, or it is free and they asked for it
        (Resolution::Allow, Some(TakeoverChoice::TakeoverTable)) => Settlement::Proceed {
            claim_table: owner.is_none(),
        },
        (Resolution::Allow, _) => Settlement::Proceed { claim_table: false },
    }
}
