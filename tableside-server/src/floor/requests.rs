//! Request Store
//!
//! Canonical status of every service request. Each request lives behind its
//! own mutex so unrelated requests never contend; the engine holds that mutex
//! across decide + commit, which makes the first committed write win.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use shared::models::{AuditEntry, AuditSubject, RequestStatus, ServiceRequest};
use shared::{RequestAction, StaffRef};

use super::error::{FloorError, FloorResult};
use super::storage::FloorStorage;

/// Apply one action to a request (pure)
///
/// ```text
/// Pending    + acknowledge → InProgress (assignee, acknowledgedAt)
/// Pending    + cancel      → Cancelled  (cancelledAt)
/// InProgress + complete    → Completed  (completedAt)
/// anything else            → InvalidTransition
/// ```
pub fn transition(
    current: &ServiceRequest,
    action: RequestAction,
    actor: &StaffRef,
    now: i64,
) -> FloorResult<ServiceRequest> {
    let mut next = current.clone();
    match (current.status, action) {
        (RequestStatus::Pending, RequestAction::Acknowledge) => {
            next.status = RequestStatus::InProgress;
            next.acknowledged_at = Some(now);
            next.assigned_staff_id = Some(actor.staff_id);
            next.assigned_staff_name = Some(actor.name.clone());
        }
        (RequestStatus::Pending, RequestAction::Cancel) => {
            next.status = RequestStatus::Cancelled;
            next.cancelled_at = Some(now);
        }
        (RequestStatus::InProgress, RequestAction::Complete) => {
            next.status = RequestStatus::Completed;
            next.completed_at = Some(now);
        }
        (RequestStatus::Pending, RequestAction::Complete)
        | (RequestStatus::InProgress, RequestAction::Acknowledge)
        | (RequestStatus::InProgress, RequestAction::Cancel)
        | (RequestStatus::Completed, _)
        | (RequestStatus::Cancelled, _) => {
            return Err(FloorError::InvalidTransition {
                from: current.status,
                action,
            });
        }
    }
    Ok(next)
}

/// In-memory request ledger backed by redb
#[derive(Debug)]
pub struct RequestStore {
    storage: FloorStorage,
    requests: DashMap<i64, Arc<Mutex<ServiceRequest>>>,
    /// Last handed-out creation time; keeps FIFO order strict
    last_created: AtomicI64,
}

impl RequestStore {
    /// Load every persisted request
    pub fn load(storage: FloorStorage) -> FloorResult<Self> {
        let requests = DashMap::new();
        let mut last_created = 0;
        for request in storage.load_requests()? {
            last_created = last_created.max(request.created_at);
            requests.insert(request.id, Arc::new(Mutex::new(request)));
        }
        tracing::debug!(count = requests.len(), "Request store loaded");
        Ok(Self {
            storage,
            requests,
            last_created: AtomicI64::new(last_created),
        })
    }

    /// Creation timestamp, strictly increasing across calls
    pub fn next_created_at(&self, now: i64) -> i64 {
        let advance = |last: i64| now.max(last + 1);
        match self
            .last_created
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(advance(last)))
        {
            Ok(last) | Err(last) => advance(last),
        }
    }

    /// Lock slot of one request
    pub fn slot(&self, id: i64) -> FloorResult<Arc<Mutex<ServiceRequest>>> {
        self.requests
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(FloorError::RequestNotFound(id))
    }

    /// Publish a freshly committed request
    pub fn publish(&self, request: ServiceRequest) {
        self.requests
            .insert(request.id, Arc::new(Mutex::new(request)));
    }

    pub fn get(&self, id: i64) -> FloorResult<ServiceRequest> {
        let slot = self.slot(id)?;
        let request = slot.lock().clone();
        Ok(request)
    }

    /// Snapshot filtered by status and `keep`, oldest first
    pub fn list<F>(&self, status: Option<RequestStatus>, keep: F) -> Vec<ServiceRequest>
    where
        F: Fn(&ServiceRequest) -> bool,
    {
        let slots: Vec<_> = self
            .requests
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let mut result: Vec<ServiceRequest> = slots
            .iter()
            .map(|slot| slot.lock().clone())
            .filter(|r| status.is_none_or(|s| r.status == s))
            .filter(|r| keep(r))
            .collect();

        result.sort_by_key(|r| (r.created_at, r.id));
        result
    }

    /// Audit trail of one request, oldest first
    pub fn history(&self, id: i64) -> FloorResult<Vec<AuditEntry>> {
        if !self.requests.contains_key(&id) {
            return Err(FloorError::RequestNotFound(id));
        }
        Ok(self.storage.audit_for(AuditSubject::Request(id))?)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
