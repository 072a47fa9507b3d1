//! Shared fixtures for API tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::NaiveDate;
use http::{Request, StatusCode};
use serde_json::Value;
use tableside_server::auth::permissions::get_default_permissions;
use tableside_server::auth::{JwtConfig, JwtService};
use tableside_server::floor::{BusinessClock, FloorEngine, FloorPlan, FloorStorage};
use tableside_server::{Config, ServerState};
use tower::ServiceExt;

pub const LOCATION: i64 = 1;
pub const SECTION: i64 = 10;
pub const T1: i64 = 100;
pub const T2: i64 = 101;

pub const ANNA: i64 = 1;
pub const BRUNO: i64 = 2;
pub const MARTA: i64 = 9;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
}

impl TestApp {
    pub fn new() -> Self {
        let plan = FloorPlan::new()
            .with_table(LOCATION, T1, "1", Some(SECTION))
            .with_table(LOCATION, T2, "2", Some(SECTION))
            .with_staff(ANNA, "Anna")
            .with_staff(BRUNO, "Bruno")
            .with_staff(MARTA, "Marta");

        let floor = FloorEngine::open(
            FloorStorage::open_in_memory().unwrap(),
            Arc::new(plan),
            BusinessClock::fixed(today()),
        )
        .unwrap();

        let mut config = Config::with_overrides("/tmp/tableside-api-test", 0);
        config.jwt = JwtConfig {
            secret: "test-secret-test-secret-test-secret!".to_string(),
            expiration_minutes: 60,
            issuer: "tableside".to_string(),
            audience: "staff-devices".to_string(),
        };
        let jwt = JwtService::with_config(config.jwt.clone());

        let state = ServerState::new(config, Arc::new(floor), Arc::new(jwt));
        Self {
            app: tableside_server::api::build_app(state.clone()),
            state,
        }
    }

    pub fn token(&self, staff_id: i64, name: &str, role: &str) -> String {
        let permissions = get_default_permissions(role);
        let permissions: Vec<&str> = permissions.iter().map(String::as_str).collect();
        self.state
            .jwt_service
            .generate_token(staff_id, name, role, &permissions)
            .unwrap()
    }

    pub fn waiter(&self, staff_id: i64, name: &str) -> String {
        self.token(staff_id, name, "waiter")
    }

    pub fn manager(&self) -> String {
        self.token(MARTA, "Marta", "manager")
    }

    pub fn guest(&self) -> String {
        self.token(900, "QR", "guest_channel")
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    /// Guest channel creates a call-waiter request, returns its id
    pub async fn call_waiter(&self, table_id: i64) -> i64 {
        let (status, body) = self
            .post(
                "/api/requests",
                &self.guest(),
                serde_json::json!({
                    "locationId": LOCATION,
                    "tableId": table_id,
                    "kind": "call_waiter",
                    "note": null
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}
