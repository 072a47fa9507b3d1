//! Server calls the synchronizer depends on
//!
//! [`HttpClient`] is the production implementation; tests plug in an
//! in-memory fake.

use std::future::Future;

use shared::models::{Assignment, RequestFilter, ServiceRequest};
use shared::{ActionOutcome, ActionPayload};

use crate::{ClientResult, HttpClient};

pub trait FloorApi: Send + Sync + 'static {
    fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> impl Future<Output = ClientResult<Vec<ServiceRequest>>> + Send;

    /// Caller's assignments for the current business date
    fn my_assignments(
        &self,
        location_id: i64,
    ) -> impl Future<Output = ClientResult<Vec<Assignment>>> + Send;

    fn act(&self, payload: &ActionPayload)
    -> impl Future<Output = ClientResult<ActionOutcome>> + Send;
}

impl FloorApi for HttpClient {
    fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> impl Future<Output = ClientResult<Vec<ServiceRequest>>> + Send {
        HttpClient::list_requests(self, filter)
    }

    fn my_assignments(
        &self,
        location_id: i64,
    ) -> impl Future<Output = ClientResult<Vec<Assignment>>> + Send {
        HttpClient::my_assignments(self, location_id, None)
    }

    fn act(
        &self,
        payload: &ActionPayload,
    ) -> impl Future<Output = ClientResult<ActionOutcome>> + Send {
        HttpClient::act(self, payload)
    }
}
