//! HTTP client for the Tableside server API

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::models::{
    Assignment, AssignmentCreate, AuditEntry, RequestFilter, SelfAssign, ServiceRequest,
    ServiceRequestCreate, TableOwner,
};
use shared::{ActionOutcome, ActionPayload};

use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for making network requests to the server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authorized(self.client.get(self.url(path)));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.authorized(self.client.post(self.url(path)).json(body));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authorized(self.client.delete(self.url(path)));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    fn status_error(status: StatusCode, text: String) -> ClientError {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::CONFLICT => ClientError::Conflict(text),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(text)
            }
            _ => ClientError::Internal(text),
        }
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::status_error(status, text));
        }

        response.json().await.map_err(Into::into)
    }

    // ========== Requests API ==========

    pub async fn list_requests(&self, filter: &RequestFilter) -> ClientResult<Vec<ServiceRequest>> {
        let mut query = Vec::new();
        if let Some(status) = filter.status {
            query.push(format!("status={}", status.as_str()));
        }
        if let Some(staff_id) = filter.only_staff_id {
            query.push(format!("onlyStaffId={staff_id}"));
        }
        let path = if query.is_empty() {
            "/api/requests".to_string()
        } else {
            format!("/api/requests?{}", query.join("&"))
        };
        self.get(&path).await
    }

    /// Requests assigned to the caller or on tables the caller owns
    pub async fn list_mine(&self) -> ClientResult<Vec<ServiceRequest>> {
        self.get("/api/requests?onlyMine=true").await
    }

    pub async fn get_request(&self, id: i64) -> ClientResult<ServiceRequest> {
        self.get(&format!("/api/requests/{id}")).await
    }

    pub async fn request_history(&self, id: i64) -> ClientResult<Vec<AuditEntry>> {
        self.get(&format!("/api/requests/{id}/history")).await
    }

    /// Guest channel ingress
    pub async fn create_request(&self, input: &ServiceRequestCreate) -> ClientResult<ServiceRequest> {
        self.post("/api/requests", input).await
    }

    /// Submit an action
    ///
    /// Business failures come back as [`ActionOutcome::Failure`] with a 4xx
    /// status, so the body is decoded before the status is looked at.
    pub async fn act(&self, payload: &ActionPayload) -> ClientResult<ActionOutcome> {
        let request = self.authorized(self.client.post(self.url("/api/requests/action")).json(payload));
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<ActionOutcome>(&text) {
            Ok(outcome) => Ok(outcome),
            Err(_) if !status.is_success() => Err(Self::status_error(status, text)),
            Err(e) => Err(ClientError::InvalidResponse(format!(
                "Unexpected action response: {e}"
            ))),
        }
    }

    // ========== Assignments API ==========

    pub async fn list_assignments(
        &self,
        location_id: i64,
        date: Option<NaiveDate>,
    ) -> ClientResult<Vec<Assignment>> {
        self.get(&roster_path("/api/assignments", location_id, date))
            .await
    }

    pub async fn my_assignments(
        &self,
        location_id: i64,
        date: Option<NaiveDate>,
    ) -> ClientResult<Vec<Assignment>> {
        self.get(&roster_path("/api/assignments/mine", location_id, date))
            .await
    }

    pub async fn grant(&self, input: &AssignmentCreate) -> ClientResult<Assignment> {
        self.post("/api/assignments", input).await
    }

    pub async fn self_assign(&self, input: &SelfAssign) -> ClientResult<Assignment> {
        self.post("/api/assignments/self", input).await
    }

    pub async fn revoke(&self, assignment_id: i64) -> ClientResult<Assignment> {
        self.delete(&format!("/api/assignments/{assignment_id}"))
            .await
    }

    pub async fn table_owner(
        &self,
        location_id: i64,
        table_id: i64,
        date: Option<NaiveDate>,
    ) -> ClientResult<TableOwner> {
        let mut path = format!("/api/tables/{location_id}/{table_id}/owner");
        if let Some(date) = date {
            path.push_str(&format!("?date={date}"));
        }
        self.get(&path).await
    }
}

fn roster_path(base: &str, location_id: i64, date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => format!("{base}?locationId={location_id}&date={date}"),
        None => format!("{base}?locationId={location_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_once() {
        let client = ClientConfig::new("http://floor.local:3000/")
            .build_http_client()
            .unwrap();
        assert_eq!(
            client.url("/api/requests"),
            "http://floor.local:3000/api/requests"
        );
        assert_eq!(client.url("health"), "http://floor.local:3000/health");
    }

    #[test]
    fn roster_query_includes_date_when_given() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            roster_path("/api/assignments", 3, Some(date)),
            "/api/assignments?locationId=3&date=2026-10-16"
        );
        assert_eq!(
            roster_path("/api/assignments/mine", 3, None),
            "/api/assignments/mine?locationId=3"
        );
    }

    #[test]
    fn statuses_map_to_errors() {
        assert!(matches!(
            HttpClient::status_error(StatusCode::CONFLICT, String::new()),
            ClientError::Conflict(_)
        ));
        assert!(matches!(
            HttpClient::status_error(StatusCode::UNAUTHORIZED, String::new()),
            ClientError::Unauthorized
        ));
    }
}
