//! redb-based storage for the floor engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `service_requests` | `request_id` | `ServiceRequest` | Request ledger |
//! | `assignments` | `assignment_id` | `Assignment` | Active ownership bindings |
//! | `audit_log` | `(subject, sequence)` | `AuditEntry` | Append-only audit trail |
//! | `sequence_counter` | `"audit_seq"` | `u64` | Audit sequence |
//!
//! Values are JSON. redb commits are durable once `commit()` returns; the
//! engine commits first and only then updates its in-memory view, so a failed
//! commit leaves the authoritative state untouched.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Assignment, AuditAction, AuditEntry, AuditSubject, ServiceRequest, StaffRef};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const REQUESTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("service_requests");

const ASSIGNMENTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("assignments");

/// key = (subject key, sequence)
const AUDIT_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("audit_log");

const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const AUDIT_SEQUENCE_KEY: &str = "audit_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Floor storage backed by redb
#[derive(Clone)]
pub struct FloorStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for FloorStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloorStorage").finish_non_exhaustive()
    }
}

impl FloorStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, throwaway runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(REQUESTS_TABLE)?;
            let _ = write_txn.open_table(ASSIGNMENTS_TABLE)?;
            let _ = write_txn.open_table(AUDIT_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(AUDIT_SEQUENCE_KEY)?.is_none() {
                seq_table.insert(AUDIT_SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Requests ==========

    pub fn store_request(&self, txn: &WriteTransaction, request: &ServiceRequest) -> StorageResult<()> {
        let mut table = txn.open_table(REQUESTS_TABLE)?;
        let value = serde_json::to_vec(request)?;
        table.insert(request.id, value.as_slice())?;
        Ok(())
    }

    pub fn load_requests(&self) -> StorageResult<Vec<ServiceRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REQUESTS_TABLE)?;

        let mut requests = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            requests.push(serde_json::from_slice(value.value())?);
        }
        Ok(requests)
    }

    // ========== Assignments ==========

    pub fn store_assignment(&self, txn: &WriteTransaction, assignment: &Assignment) -> StorageResult<()> {
        let mut table = txn.open_table(ASSIGNMENTS_TABLE)?;
        let value = serde_json::to_vec(assignment)?;
        table.insert(assignment.id, value.as_slice())?;
        Ok(())
    }

    /// Returns whether the assignment existed
    pub fn remove_assignment(&self, txn: &WriteTransaction, id: i64) -> StorageResult<bool> {
        let mut table = txn.open_table(ASSIGNMENTS_TABLE)?;
        let removed = table.remove(id)?.is_some();
        Ok(removed)
    }

    pub fn load_assignments(&self) -> StorageResult<Vec<Assignment>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ASSIGNMENTS_TABLE)?;

        let mut assignments = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            assignments.push(serde_json::from_slice(value.value())?);
        }
        Ok(assignments)
    }

    // ========== Audit ==========

    /// Append an audit entry within the caller's transaction
    pub fn append_audit(
        &self,
        txn: &WriteTransaction,
        subject: AuditSubject,
        action: AuditAction,
        actor: Option<&StaffRef>,
        detail: serde_json::Value,
    ) -> StorageResult<AuditEntry> {
        let sequence = {
            let mut seq_table = txn.open_table(SEQUENCE_TABLE)?;
            let current = seq_table
                .get(AUDIT_SEQUENCE_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0);
            let next = current + 1;
            seq_table.insert(AUDIT_SEQUENCE_KEY, next)?;
            next
        };

        let entry = AuditEntry {
            sequence,
            at: shared::util::now_millis(),
            subject,
            action,
            actor_id: actor.map(|a| a.staff_id),
            actor_name: actor.map(|a| a.name.clone()),
            detail,
        };

        let key = subject.key();
        let mut table = txn.open_table(AUDIT_TABLE)?;
        let value = serde_json::to_vec(&entry)?;
        table.insert((key.as_str(), sequence), value.as_slice())?;
        Ok(entry)
    }

    /// Audit entries for one subject, oldest first
    pub fn audit_for(&self, subject: AuditSubject) -> StorageResult<Vec<AuditEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AUDIT_TABLE)?;

        let key = subject.key();
        let range_start = (key.as_str(), 0u64);
        let range_end = (key.as_str(), u64::MAX);

        let mut entries = Vec::new();
        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let entry: AuditEntry = serde_json::from_slice(value.value())?;
            entries.push(entry);
        }

        entries.sort_by_key(|e| e.sequence);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::{AssignmentMethod, AssignmentScope, RequestKind, RequestStatus};

    fn sample_request(id: i64) -> ServiceRequest {
        ServiceRequest {
            id,
            location_id: 1,
            table_id: 100,
            table_number: "1".to_string(),
            kind: RequestKind::RequestBill,
            note: Some("per favore".to_string()),
            status: RequestStatus::Pending,
            created_at: 1_000 + id,
            acknowledged_at: None,
            completed_at: None,
            cancelled_at: None,
            assigned_staff_id: None,
            assigned_staff_name: None,
        }
    }

    fn sample_assignment(id: i64) -> Assignment {
        Assignment {
            id,
            staff_id: 7,
            staff_name: "Giulia".to_string(),
            location_id: 1,
            shift_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            scope: AssignmentScope::Section { section_id: 10 },
            method: AssignmentMethod::Manual,
            created_at: 0,
            created_by: Some(1),
        }
    }

    #[test]
    fn requests_and_assignments_round_trip_through_a_transaction() {
        let storage = FloorStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.store_request(&txn, &sample_request(1)).unwrap();
        storage.store_request(&txn, &sample_request(2)).unwrap();
        storage.store_assignment(&txn, &sample_assignment(50)).unwrap();
        txn.commit().unwrap();

        let mut requests = storage.load_requests().unwrap();
        requests.sort_by_key(|r| r.id);
        assert_eq!(requests, vec![sample_request(1), sample_request(2)]);
        assert_eq!(storage.load_assignments().unwrap(), vec![sample_assignment(50)]);
    }

    #[test]
    fn uncommitted_writes_are_discarded() {
        let storage = FloorStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.store_request(&txn, &sample_request(1)).unwrap();
        drop(txn);

        assert!(storage.load_requests().unwrap().is_empty());
    }

    #[test]
    fn remove_assignment_reports_existence() {
        let storage = FloorStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.store_assignment(&txn, &sample_assignment(50)).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        assert!(storage.remove_assignment(&txn, 50).unwrap());
        assert!(!storage.remove_assignment(&txn, 51).unwrap());
        txn.commit().unwrap();

        assert!(storage.load_assignments().unwrap().is_empty());
    }

    #[test]
    fn audit_is_scoped_per_subject_and_sequenced() {
        let storage = FloorStorage::open_in_memory().unwrap();
        let actor = StaffRef::new(7, "Giulia");

        let txn = storage.begin_write().unwrap();
        storage
            .append_audit(
                &txn,
                AuditSubject::Request(1),
                AuditAction::RequestCreated,
                None,
                serde_json::Value::Null,
            )
            .unwrap();
        storage
            .append_audit(
                &txn,
                AuditSubject::Request(2),
                AuditAction::RequestCreated,
                None,
                serde_json::Value::Null,
            )
            .unwrap();
        storage
            .append_audit(
                &txn,
                AuditSubject::Request(1),
                AuditAction::RequestAcknowledged,
                Some(&actor),
                serde_json::json!({ "takeover": false }),
            )
            .unwrap();
        txn.commit().unwrap();

        let history = storage.audit_for(AuditSubject::Request(1)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, AuditAction::RequestCreated);
        assert_eq!(history[1].action, AuditAction::RequestAcknowledged);
        assert_eq!(history[1].actor_id, Some(7));
        assert!(history[0].sequence < history[1].sequence);
    }

    #[test]
    fn reopening_a_file_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("floor.redb");

        {
            let storage = FloorStorage::open(&path).unwrap();
            let txn = storage.begin_write().unwrap();
            storage.store_request(&txn, &sample_request(9)).unwrap();
            txn.commit().unwrap();
        }

        let storage = FloorStorage::open(&path).unwrap();
        assert_eq!(storage.load_requests().unwrap(), vec![sample_request(9)]);
    }
}
