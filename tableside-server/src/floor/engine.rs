//! Floor engine
//!
//! Ties the request store, the assignment registry, the resolver and the
//! negotiator together. All operations are synchronous and short.
//!
//! Locking: request mutex first, then the roster lock of
//! `(request.location_id, business date)`. Grant/revoke only take the roster
//! lock. The resolver input is read and the commit is made under the same
//! guards, and redb commits before the in-memory state changes.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use shared::action::ConfirmationPrompt;
use shared::models::{
    Assignment, AssignmentCreate, AssignmentMethod, AssignmentScope, AuditAction, AuditEntry,
    AuditSubject, RequestFilter, RequestStatus, SelfAssign, ServiceRequest, ServiceRequestCreate,
    TableOwner,
};
use shared::{ActionPayload, RequestAction, StaffRef, TakeoverChoice};

use super::assignments::{AssignmentRegistry, RosterKey};
use super::conflict::{self, Resolution};
use super::directory::Directory;
use super::error::{FloorError, FloorResult};
use super::requests::{self, RequestStore};
use super::storage::{FloorStorage, StorageError};
use super::takeover::{self, Settlement};
use crate::utils::time;

/// Business date source
///
/// Before the cutoff the previous day's shift is still running.
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    tz: Tz,
    cutoff: NaiveTime,
    fixed: Option<NaiveDate>,
}

impl BusinessClock {
    pub fn new(tz: Tz, cutoff: NaiveTime) -> Self {
        Self {
            tz,
            cutoff,
            fixed: None,
        }
    }

    /// Clock pinned to one date
    pub fn fixed(date: NaiveDate) -> Self {
        Self {
            tz: chrono_tz::UTC,
            cutoff: NaiveTime::MIN,
            fixed: Some(date),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed
            .unwrap_or_else(|| time::current_business_date(self.cutoff, self.tz))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn cutoff(&self) -> NaiveTime {
        self.cutoff
    }
}

/// Result of a request action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Performed {
    Done(ServiceRequest),
    /// Table owned by someone else; nothing was written
    NeedsConfirmation(ConfirmationPrompt),
}

#[derive(Debug)]
pub struct FloorEngine {
    storage: FloorStorage,
    directory: Arc<dyn Directory>,
    requests: RequestStore,
    assignments: AssignmentRegistry,
    clock: BusinessClock,
}

impl FloorEngine {
    /// Load persisted state
    pub fn open(
        storage: FloorStorage,
        directory: Arc<dyn Directory>,
        clock: BusinessClock,
    ) -> FloorResult<Self> {
        let requests = RequestStore::load(storage.clone())?;
        let assignments = AssignmentRegistry::load(storage.clone(), directory.clone())?;

        tracing::info!(
            requests = requests.len(),
            business_date = %clock.today(),
            "Floor engine ready"
        );

        Ok(Self {
            storage,
            directory,
            requests,
            assignments,
            clock,
        })
    }

    pub fn clock(&self) -> &BusinessClock {
        &self.clock
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Staff display name: floor plan first, token name otherwise
    pub fn identify(&self, actor: &StaffRef) -> StaffRef {
        match self.directory.staff_name(actor.staff_id) {
            Some(name) => StaffRef::new(actor.staff_id, name),
            None => actor.clone(),
        }
    }

    fn staff_ref(&self, staff_id: i64) -> StaffRef {
        let name = self
            .directory
            .staff_name(staff_id)
            .unwrap_or_else(|| format!("Staff {staff_id}"));
        StaffRef::new(staff_id, name)
    }

    fn today_key(&self, location_id: i64) -> RosterKey {
        RosterKey::new(location_id, self.clock.today())
    }

    // ========== Requests ==========

    /// Guest channel ingress
    pub fn create_request(&self, input: ServiceRequestCreate) -> FloorResult<ServiceRequest> {
        let table = self
            .directory
            .table(input.location_id, input.table_id)
            .ok_or(FloorError::TableNotFound {
                location_id: input.location_id,
                table_id: input.table_id,
            })?;

        let request = ServiceRequest {
            id: shared::util::snowflake_id(),
            location_id: input.location_id,
            table_id: input.table_id,
            table_number: table.number,
            kind: input.kind,
            note: input.note.filter(|n| !n.trim().is_empty()),
            status: RequestStatus::Pending,
            created_at: self.requests.next_created_at(shared::util::now_millis()),
            acknowledged_at: None,
            completed_at: None,
            cancelled_at: None,
            assigned_staff_id: None,
            assigned_staff_name: None,
        };

        let txn = self.storage.begin_write()?;
        self.storage.store_request(&txn, &request)?;
        self.storage.append_audit(
            &txn,
            AuditSubject::Request(request.id),
            AuditAction::RequestCreated,
            None,
            serde_json::json!({ "kind": request.kind, "tableId": request.table_id }),
        )?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            request_id = request.id,
            table_id = request.table_id,
            kind = ?request.kind,
            "Service request created"
        );

        self.requests.publish(request.clone());
        Ok(request)
    }

    pub fn get_request(&self, id: i64) -> FloorResult<ServiceRequest> {
        self.requests.get(id)
    }

    pub fn request_history(&self, id: i64) -> FloorResult<Vec<AuditEntry>> {
        self.requests.history(id)
    }

    /// Oldest first; `only_staff_id` keeps requests assigned to that staff
    /// member or on tables they currently own
    pub fn list_requests(&self, filter: &RequestFilter) -> Vec<ServiceRequest> {
        match filter.only_staff_id {
            None => self.requests.list(filter.status, |_| true),
            Some(staff_id) => {
                let today = self.clock.today();
                self.requests.list(filter.status, |r| {
                    r.assigned_staff_id == Some(staff_id)
                        || self
                            .assignments
                            .resolve_owner(r.location_id, r.table_id, today)
                            .owner
                            .is_some_and(|o| o.staff_id == staff_id)
                })
            }
        }
    }

    /// Dispatch a device action
    pub fn perform(&self, actor: &StaffRef, payload: &ActionPayload) -> FloorResult<Performed> {
        match payload.action {
            RequestAction::Acknowledge => {
                self.acknowledge(payload.request_id, actor, payload.choice())
            }
            RequestAction::Complete => self.complete(payload.request_id, actor).map(Performed::Done),
            RequestAction::Cancel => self.cancel(payload.request_id, actor).map(Performed::Done),
        }
    }

    /// Acknowledge, negotiating a takeover when the table is someone else's
    ///
    /// `choice` is `None` on the first round. A replay by the staff member
    /// who already holds the request returns it unchanged.
    pub fn acknowledge(
        &self,
        request_id: i64,
        actor: &StaffRef,
        choice: Option<TakeoverChoice>,
    ) -> FloorResult<Performed> {
        let actor = self.identify(actor);
        let slot = self.requests.slot(request_id)?;
        let mut request = slot.lock();

        if request.status == RequestStatus::InProgress
            && request.assigned_staff_id == Some(actor.staff_id)
        {
            tracing::debug!(request_id, staff_id = actor.staff_id, "Acknowledge replay, no-op");
            return Ok(Performed::Done(request.clone()));
        }

        let now = shared::util::now_millis();
        let updated = requests::transition(&request, RequestAction::Acknowledge, &actor, now)?;

        let key = self.today_key(request.location_id);
        let roster_lock = self.assignments.roster(key);
        let mut roster = roster_lock.write();

        let owner = self
            .assignments
            .owner_in(&roster, request.location_id, request.table_id)
            .map(Assignment::staff);
        let resolution =
            conflict::resolve(RequestAction::Acknowledge, actor.staff_id, &request, owner.as_ref());

        let claim_table = match takeover::settle(resolution, choice, owner.as_ref()) {
            Settlement::Prompt(incumbent) => {
                tracing::info!(
                    request_id,
                    table_id = request.table_id,
                    staff_id = actor.staff_id,
                    owner_id = incumbent.staff_id,
                    "Acknowledge needs takeover confirmation"
                );
                return Ok(Performed::NeedsConfirmation(ConfirmationPrompt {
                    needs_confirmation: true,
                    request_id,
                    table_id: request.table_id,
                    table_number: request.table_number.clone(),
                    assigned_to: incumbent,
                }));
            }
            Settlement::Reject => return Err(FloorError::NotOwner { request_id }),
            Settlement::Proceed { claim_table } => claim_table,
        };

        let txn = self.storage.begin_write()?;
        let change = if claim_table {
            Some(self.assignments.stage_supersede(
                &txn,
                &roster,
                &actor,
                key,
                request.table_id,
                owner.as_ref(),
            )?)
        } else {
            None
        };
        self.storage.store_request(&txn, &updated)?;
        self.storage.append_audit(
            &txn,
            AuditSubject::Request(request_id),
            AuditAction::RequestAcknowledged,
            Some(&actor),
            serde_json::json!({
                "takeover": claim_table,
                "handledFor": owner.as_ref().filter(|o| o.staff_id != actor.staff_id),
            }),
        )?;
        txn.commit().map_err(StorageError::from)?;

        if let Some(change) = change {
            self.assignments.apply_supersede(&mut roster, change);
        }
        *request = updated.clone();

        tracing::info!(
            request_id,
            table_id = updated.table_id,
            staff_id = actor.staff_id,
            takeover = claim_table,
            "Service request acknowledged"
        );
        Ok(Performed::Done(updated))
    }

    /// InProgress → Completed, by the assignee or the table owner
    pub fn complete(&self, request_id: i64, actor: &StaffRef) -> FloorResult<ServiceRequest> {
        self.finish(request_id, actor, RequestAction::Complete)
    }

    /// Pending → Cancelled, by the table owner or anyone on an unowned table
    pub fn cancel(&self, request_id: i64, actor: &StaffRef) -> FloorResult<ServiceRequest> {
        self.finish(request_id, actor, RequestAction::Cancel)
    }

    fn finish(
        &self,
        request_id: i64,
        actor: &StaffRef,
        action: RequestAction,
    ) -> FloorResult<ServiceRequest> {
        let actor = self.identify(actor);
        let slot = self.requests.slot(request_id)?;
        let mut request = slot.lock();

        let now = shared::util::now_millis();
        let updated = requests::transition(&request, action, &actor, now)?;

        let key = self.today_key(request.location_id);
        let roster_lock = self.assignments.existing_roster(key);
        let roster = roster_lock.as_ref().map(|lock| lock.read());

        let owner = roster
            .as_deref()
            .and_then(|roster| {
                self.assignments
                    .owner_in(roster, request.location_id, request.table_id)
            })
            .map(Assignment::staff);
        if conflict::resolve(action, actor.staff_id, &request, owner.as_ref()) == Resolution::Deny {
            tracing::warn!(
                request_id,
                staff_id = actor.staff_id,
                action = action.as_str(),
                "Action denied, not owner"
            );
            return Err(FloorError::NotOwner { request_id });
        }

        let audit_action = match action {
            RequestAction::Complete => AuditAction::RequestCompleted,
            RequestAction::Cancel => AuditAction::RequestCancelled,
            RequestAction::Acknowledge => AuditAction::RequestAcknowledged,
        };

        let txn = self.storage.begin_write()?;
        self.storage.store_request(&txn, &updated)?;
        self.storage.append_audit(
            &txn,
            AuditSubject::Request(request_id),
            audit_action,
            Some(&actor),
            serde_json::Value::Null,
        )?;
        txn.commit().map_err(StorageError::from)?;

        *request = updated.clone();

        tracing::info!(
            request_id,
            staff_id = actor.staff_id,
            status = ?updated.status,
            "Service request updated"
        );
        Ok(updated)
    }

    // ========== Assignments ==========

    /// Shift date for a write; defaults to today, past dates are rejected
    fn writable_shift_date(&self, requested: Option<NaiveDate>) -> FloorResult<NaiveDate> {
        let today = self.clock.today();
        match requested {
            None => Ok(today),
            Some(date) if date < today => Err(FloorError::Validation(format!(
                "Shift date {date} is in the past (business date is {today})"
            ))),
            Some(date) => Ok(date),
        }
    }

    /// Manual grant by a manager
    pub fn grant(&self, actor: &StaffRef, input: AssignmentCreate) -> FloorResult<Assignment> {
        let scope = AssignmentScope::from_parts(input.section_id, input.table_id)
            .map_err(|e| FloorError::Validation(e.to_string()))?;
        let shift_date = self.writable_shift_date(input.shift_date)?;
        let staff = self.staff_ref(input.staff_id);
        let actor = self.identify(actor);

        self.assignments.grant(
            staff,
            RosterKey::new(input.location_id, shift_date),
            scope,
            AssignmentMethod::Manual,
            Some(&actor),
        )
    }

    /// Staff member claims a scope for themselves
    pub fn self_assign(&self, actor: &StaffRef, input: SelfAssign) -> FloorResult<Assignment> {
        let scope = AssignmentScope::from_parts(input.section_id, input.table_id)
            .map_err(|e| FloorError::Validation(e.to_string()))?;
        let shift_date = self.writable_shift_date(input.shift_date)?;
        let actor = self.identify(actor);

        self.assignments.grant(
            actor.clone(),
            RosterKey::new(input.location_id, shift_date),
            scope,
            AssignmentMethod::SelfAssign,
            Some(&actor),
        )
    }

    pub fn revoke(&self, assignment_id: i64, actor: &StaffRef) -> FloorResult<Assignment> {
        let actor = self.identify(actor);
        self.assignments.revoke(assignment_id, Some(&actor))
    }

    pub fn list_assignments(&self, location_id: i64, date: Option<NaiveDate>) -> Vec<Assignment> {
        let shift_date = date.unwrap_or_else(|| self.clock.today());
        self.assignments.list(RosterKey::new(location_id, shift_date))
    }

    pub fn list_for_staff(
        &self,
        staff_id: i64,
        location_id: i64,
        date: Option<NaiveDate>,
    ) -> Vec<Assignment> {
        let shift_date = date.unwrap_or_else(|| self.clock.today());
        self.assignments
            .list_for_staff(staff_id, RosterKey::new(location_id, shift_date))
    }

    pub fn resolve_owner(
        &self,
        location_id: i64,
        table_id: i64,
        date: Option<NaiveDate>,
    ) -> TableOwner {
        let shift_date = date.unwrap_or_else(|| self.clock.today());
        self.assignments
            .resolve_owner(location_id, table_id, shift_date)
    }

    /// Drop assignments of past shift dates
    pub fn purge_expired(&self) -> FloorResult<usize> {
        let today = self.clock.today();
        let purged = self.assignments.purge_before(today)?;
        if purged > 0 {
            tracing::info!(purged, business_date = %today, "Expired assignments purged");
        }
        Ok(purged)
    }
}
