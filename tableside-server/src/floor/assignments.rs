//! Assignment Registry
//!
//! Assignments are grouped into rosters, one per `(location, shift date)`.
//! Every roster has its own `RwLock`; ownership of a table is resolved
//! against a single roster, so a resolve and the commit that depends on it
//! can share one lock.
//!
//! Ownership precedence: table > section > venue.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::RwLock;
use redb::WriteTransaction;
use shared::StaffRef;
use shared::models::{
    Assignment, AssignmentMethod, AssignmentScope, AuditAction, AuditSubject, TableOwner,
};

use super::directory::Directory;
use super::error::{FloorError, FloorResult};
use super::storage::{FloorStorage, StorageError};

/// Roster identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RosterKey {
    pub location_id: i64,
    pub shift_date: NaiveDate,
}

impl RosterKey {
    pub fn new(location_id: i64, shift_date: NaiveDate) -> Self {
        Self {
            location_id,
            shift_date,
        }
    }
}

/// Active assignments of one location for one shift date
#[derive(Debug, Default)]
pub struct Roster {
    assignments: Vec<Assignment>,
}

impl Roster {
    /// Most specific assignment covering the table
    pub fn resolve(&self, table_id: i64, section_id: Option<i64>) -> Option<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| match a.scope {
                AssignmentScope::Table { table_id: t } => t == table_id,
                AssignmentScope::Section { section_id: s } => section_id == Some(s),
                AssignmentScope::Venue => true,
            })
            .max_by_key(|a| (a.scope.specificity(), a.created_at, a.id))
    }

    pub fn find_exact(&self, scope: &AssignmentScope) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.scope == scope)
    }

    fn find_by_id(&self, id: i64) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub fn for_staff(&self, staff_id: i64) -> Vec<Assignment> {
        self.sorted()
            .into_iter()
            .filter(|a| a.staff_id == staff_id)
            .collect()
    }

    /// Ordered by specificity, then creation
    pub fn sorted(&self) -> Vec<Assignment> {
        let mut result = self.assignments.clone();
        result.sort_by_key(|a| (a.scope.specificity(), a.created_at, a.id));
        result
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    fn insert(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    fn remove(&mut self, id: i64) -> Option<Assignment> {
        let pos = self.assignments.iter().position(|a| a.id == id)?;
        Some(self.assignments.remove(pos))
    }

    fn drain(&mut self) -> Vec<Assignment> {
        std::mem::take(&mut self.assignments)
    }
}

/// Staged table takeover, applied to the roster after commit
#[derive(Debug, Clone)]
pub struct Supersede {
    pub replaced: Option<Assignment>,
    pub granted: Assignment,
}

/// In-memory assignment ledger backed by redb
#[derive(Debug)]
pub struct AssignmentRegistry {
    storage: FloorStorage,
    directory: Arc<dyn Directory>,
    rosters: DashMap<RosterKey, Arc<RwLock<Roster>>>,
    /// assignment id → roster
    index: DashMap<i64, RosterKey>,
}

impl AssignmentRegistry {
    pub fn load(storage: FloorStorage, directory: Arc<dyn Directory>) -> FloorResult<Self> {
        let registry = Self {
            storage,
            directory,
            rosters: DashMap::new(),
            index: DashMap::new(),
        };

        let assignments = registry.storage.load_assignments()?;
        let count = assignments.len();
        for assignment in assignments {
            let key = RosterKey::new(assignment.location_id, assignment.shift_date);
            registry.index.insert(assignment.id, key);
            registry.roster(key).write().insert(assignment);
        }
        tracing::debug!(count, "Assignment registry loaded");

        Ok(registry)
    }

    /// Roster lock for a key (created empty on first use)
    pub fn roster(&self, key: RosterKey) -> Arc<RwLock<Roster>> {
        self.rosters.entry(key).or_default().value().clone()
    }

    /// Owner of a table within an already locked roster
    pub fn owner_in<'a>(
        &self,
        roster: &'a Roster,
        location_id: i64,
        table_id: i64,
    ) -> Option<&'a Assignment> {
        let section_id = self
            .directory
            .table(location_id, table_id)
            .and_then(|t| t.section_id);
        roster.resolve(table_id, section_id)
    }

    /// Roster lock for a key, without creating it
    pub fn existing_roster(&self, key: RosterKey) -> Option<Arc<RwLock<Roster>>> {
        self.rosters.get(&key).map(|entry| entry.value().clone())
    }

    /// Resolve ownership: table → section → venue
    ///
    /// Read-only: an unknown roster resolves to unowned and is not created.
    pub fn resolve_owner(&self, location_id: i64, table_id: i64, shift_date: NaiveDate) -> TableOwner {
        let roster_lock = self.existing_roster(RosterKey::new(location_id, shift_date));
        let roster = roster_lock.as_ref().map(|lock| lock.read());
        let owner = roster
            .as_deref()
            .and_then(|roster| self.owner_in(roster, location_id, table_id));

        TableOwner {
            location_id,
            table_id,
            shift_date,
            owner: owner.map(Assignment::staff),
            assignment_id: owner.map(|a| a.id),
        }
    }

    /// Bind a staff member to a scope
    ///
    /// Re-granting the same scope to the same staff returns the existing
    /// assignment. Fails with `OwnershipConflict` when the scope is held by
    /// someone else, or when any table it covers would change hands.
    pub fn grant(
        &self,
        staff: StaffRef,
        key: RosterKey,
        scope: AssignmentScope,
        method: AssignmentMethod,
        created_by: Option<&StaffRef>,
    ) -> FloorResult<Assignment> {
        self.validate_scope(key.location_id, &scope)?;

        let roster_lock = self.roster(key);
        let mut roster = roster_lock.write();

        if let Some(existing) = roster.find_exact(&scope) {
            if existing.staff_id == staff.staff_id {
                tracing::debug!(assignment_id = existing.id, "Grant is a repeat, returning existing");
                return Ok(existing.clone());
            }
            return Err(FloorError::OwnershipConflict {
                incumbent: existing.staff(),
            });
        }
        if let Some(incumbent) =
            self.displaced_owner(&roster, key.location_id, &scope, staff.staff_id)
        {
            return Err(FloorError::OwnershipConflict { incumbent });
        }

        let assignment = new_assignment(&staff, key, scope, method, created_by);

        let txn = self.storage.begin_write()?;
        self.storage.store_assignment(&txn, &assignment)?;
        self.storage.append_audit(
            &txn,
            AuditSubject::Assignment(assignment.id),
            AuditAction::AssignmentGranted,
            created_by,
            serde_json::json!({
                "staffId": assignment.staff_id,
                "scope": assignment.scope,
                "method": assignment.method,
                "shiftDate": assignment.shift_date,
            }),
        )?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            assignment_id = assignment.id,
            staff_id = assignment.staff_id,
            location_id = key.location_id,
            shift_date = %key.shift_date,
            scope = ?assignment.scope,
            "Assignment granted"
        );

        self.index.insert(assignment.id, key);
        roster.insert(assignment.clone());
        Ok(assignment)
    }

    /// Stage a table takeover inside the caller's transaction
    ///
    /// The caller holds the roster write lock and must call
    /// [`apply_supersede`](Self::apply_supersede) after a successful commit.
    pub fn stage_supersede(
        &self,
        txn: &WriteTransaction,
        roster: &Roster,
        actor: &StaffRef,
        key: RosterKey,
        table_id: i64,
        previous_owner: Option<&StaffRef>,
    ) -> FloorResult<Supersede> {
        let scope = AssignmentScope::Table { table_id };
        let replaced = roster.find_exact(&scope).cloned();

        if let Some(old) = &replaced {
            self.storage.remove_assignment(txn, old.id)?;
            self.storage.append_audit(
                txn,
                AuditSubject::Assignment(old.id),
                AuditAction::AssignmentSuperseded,
                Some(actor),
                serde_json::json!({ "tableId": table_id, "staffId": old.staff_id }),
            )?;
        }

        let granted = new_assignment(actor, key, scope, AssignmentMethod::Manual, Some(actor));
        self.storage.store_assignment(txn, &granted)?;
        self.storage.append_audit(
            txn,
            AuditSubject::Assignment(granted.id),
            AuditAction::AssignmentGranted,
            Some(actor),
            serde_json::json!({
                "staffId": granted.staff_id,
                "scope": granted.scope,
                "method": granted.method,
                "shiftDate": granted.shift_date,
                "takeoverFrom": previous_owner,
            }),
        )?;

        Ok(Supersede { replaced, granted })
    }

    pub fn apply_supersede(&self, roster: &mut Roster, change: Supersede) {
        if let Some(old) = change.replaced {
            roster.remove(old.id);
            self.index.remove(&old.id);
        }
        let key = RosterKey::new(change.granted.location_id, change.granted.shift_date);
        self.index.insert(change.granted.id, key);
        roster.insert(change.granted);
    }

    /// Remove a binding; the scope is free immediately
    pub fn revoke(&self, assignment_id: i64, actor: Option<&StaffRef>) -> FloorResult<Assignment> {
        let key = self
            .index
            .get(&assignment_id)
            .map(|entry| *entry.value())
            .ok_or(FloorError::AssignmentNotFound(assignment_id))?;

        let roster_lock = self.roster(key);
        let mut roster = roster_lock.write();

        let Some(assignment) = roster.find_by_id(assignment_id).cloned() else {
            return Err(FloorError::AssignmentNotFound(assignment_id));
        };

        let txn = self.storage.begin_write()?;
        self.storage.remove_assignment(&txn, assignment_id)?;
        self.storage.append_audit(
            &txn,
            AuditSubject::Assignment(assignment_id),
            AuditAction::AssignmentRevoked,
            actor,
            serde_json::json!({ "staffId": assignment.staff_id, "scope": assignment.scope }),
        )?;
        txn.commit().map_err(StorageError::from)?;

        roster.remove(assignment_id);
        self.index.remove(&assignment_id);

        tracing::info!(
            assignment_id,
            staff_id = assignment.staff_id,
            "Assignment revoked"
        );
        Ok(assignment)
    }

    pub fn list(&self, key: RosterKey) -> Vec<Assignment> {
        match self.rosters.get(&key).map(|entry| entry.value().clone()) {
            Some(roster) => roster.read().sorted(),
            None => Vec::new(),
        }
    }

    pub fn list_for_staff(&self, staff_id: i64, key: RosterKey) -> Vec<Assignment> {
        match self.rosters.get(&key).map(|entry| entry.value().clone()) {
            Some(roster) => roster.read().for_staff(staff_id),
            None => Vec::new(),
        }
    }

    /// Drop every assignment whose shift date is before `date`
    ///
    /// Expired rosters stay in the map (empty) so that a lock handed out
    /// earlier keeps referring to the live roster.
    pub fn purge_before(&self, date: NaiveDate) -> FloorResult<usize> {
        let expired: Vec<(RosterKey, Arc<RwLock<Roster>>)> = self
            .rosters
            .iter()
            .filter(|entry| entry.key().shift_date < date)
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut purged = 0;
        for (key, roster_lock) in expired {
            let mut roster = roster_lock.write();
            if roster.is_empty() {
                continue;
            }

            let txn = self.storage.begin_write()?;
            for assignment in roster.assignments.iter() {
                self.storage.remove_assignment(&txn, assignment.id)?;
                self.storage.append_audit(
                    &txn,
                    AuditSubject::Assignment(assignment.id),
                    AuditAction::AssignmentExpired,
                    None,
                    serde_json::json!({ "shiftDate": key.shift_date }),
                )?;
            }
            txn.commit().map_err(StorageError::from)?;

            for assignment in roster.drain() {
                self.index.remove(&assignment.id);
                purged += 1;
            }
            tracing::debug!(location_id = key.location_id, shift_date = %key.shift_date, "Roster expired");
        }

        Ok(purged)
    }

    /// Other staff member who would lose a table to a new binding
    ///
    /// A new binding is the newest one, so it wins every covered table whose
    /// current owner is no more specific than `scope`.
    fn displaced_owner(
        &self,
        roster: &Roster,
        location_id: i64,
        scope: &AssignmentScope,
        staff_id: i64,
    ) -> Option<StaffRef> {
        let covered: Vec<i64> = match *scope {
            AssignmentScope::Table { table_id } => vec![table_id],
            AssignmentScope::Section { section_id } => self
                .directory
                .tables(location_id)
                .into_iter()
                .filter(|t| t.section_id == Some(section_id))
                .map(|t| t.table_id)
                .collect(),
            AssignmentScope::Venue => self
                .directory
                .tables(location_id)
                .into_iter()
                .map(|t| t.table_id)
                .collect(),
        };

        covered
            .into_iter()
            .filter_map(|table_id| self.owner_in(roster, location_id, table_id))
            .find(|owner| {
                owner.staff_id != staff_id && owner.scope.specificity() <= scope.specificity()
            })
            .map(Assignment::staff)
    }

    fn validate_scope(&self, location_id: i64, scope: &AssignmentScope) -> FloorResult<()> {
        match *scope {
            AssignmentScope::Venue => Ok(()),
            AssignmentScope::Section { section_id } => {
                if self.directory.has_section(location_id, section_id) {
                    Ok(())
                } else {
                    Err(FloorError::SectionNotFound {
                        location_id,
                        section_id,
                    })
                }
            }
            AssignmentScope::Table { table_id } => self
                .directory
                .table(location_id, table_id)
                .map(|_| ())
                .ok_or(FloorError::TableNotFound {
                    location_id,
                    table_id,
                }),
        }
    }
}

fn new_assignment(
    staff: &StaffRef,
    key: RosterKey,
    scope: AssignmentScope,
    method: AssignmentMethod,
    created_by: Option<&StaffRef>,
) -> Assignment {
    Assignment {
        id: shared::util::snowflake_id(),
        staff_id: staff.staff_id,
        staff_name: staff.name.clone(),
        location_id: key.location_id,
        shift_date: key.shift_date,
        scope,
        method,
        created_at: shared::util::now_millis(),
        created_by: created_by.map(|s| s.staff_id),
    }
}
