use shared::ErrorKind;
use shared::models::{Assignment, ServiceRequest};

/// Last failed poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub at: i64,
}

/// Device-side view of the floor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloorCache {
    /// Oldest first, as returned by the server
    pub requests: Vec<ServiceRequest>,
    /// Caller's own assignments
    pub assignments: Vec<Assignment>,
    /// Time of the last successful poll (Unix millis)
    pub synced_at: Option<i64>,
    pub last_error: Option<SyncFailure>,
    /// Requests changed locally since the last poll
    pub optimistic: Vec<i64>,
}

impl FloorCache {
    /// Poll result wins over anything local
    pub fn replace(&mut self, requests: Vec<ServiceRequest>, assignments: Vec<Assignment>, at: i64) {
        self.requests = requests;
        self.assignments = assignments;
        self.synced_at = Some(at);
        self.last_error = None;
        self.optimistic.clear();
    }

    /// Put the server's answer to an action in place until the next poll
    pub fn apply_optimistic(&mut self, request: ServiceRequest) {
        let id = request.id;
        match self.requests.iter_mut().find(|r| r.id == id) {
            Some(slot) => *slot = request,
            None => {
                self.requests.push(request);
                self.requests.sort_by_key(|r| (r.created_at, r.id));
            }
        }
        if !self.optimistic.contains(&id) {
            self.optimistic.push(id);
        }
    }

    /// Keeps the previous data, only the error is recorded
    pub fn record_failure(&mut self, kind: ErrorKind, message: impl Into<String>, at: i64) {
        self.last_error = Some(SyncFailure {
            kind,
            message: message.into(),
            at,
        });
    }

    pub fn request(&self, id: i64) -> Option<&ServiceRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}
