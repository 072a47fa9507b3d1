//! HTTP API tests (tower oneshot, no network)

mod common;

use common::*;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["businessDate"], "2026-10-16");
}

#[tokio::test]
async fn api_requires_a_valid_token() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/requests", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    let (status, body) = app.get("/api/requests", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn permissions_are_enforced_per_route() {
    let app = TestApp::new();

    // guest channel may create but not act
    let (status, _) = app
        .post(
            "/api/requests/action",
            &app.guest(),
            json!({ "requestId": 1, "action": "acknowledge" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // waiters cannot grant
    let (status, body) = app
        .post(
            "/api/assignments",
            &app.waiter(ANNA, "Anna"),
            json!({ "staffId": ANNA, "locationId": LOCATION, "tableId": T1 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");
}

#[tokio::test]
async fn takeover_handshake_over_http() {
    let app = TestApp::new();
    let manager = app.manager();
    let bruno = app.waiter(BRUNO, "Bruno");

    let (status, granted) = app
        .post(
            "/api/assignments",
            &manager,
            json!({ "staffId": ANNA, "locationId": LOCATION, "tableId": T1 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{granted}");
    assert_eq!(granted["staffName"], "Anna");
    assert_eq!(granted["method"], "manual");

    let request_id = app.call_waiter(T1).await;

    // first round: prompt, nothing written
    let (status, prompt) = app
        .post(
            "/api/requests/action",
            &bruno,
            json!({ "requestId": request_id, "action": "acknowledge" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prompt["needsConfirmation"], true);
    assert_eq!(prompt["tableNumber"], "1");
    assert_eq!(prompt["assignedTo"]["staffId"], ANNA);
    assert_eq!(prompt["assignedTo"]["name"], "Anna");

    let (_, current) = app
        .get(&format!("/api/requests/{request_id}"), &bruno)
        .await;
    assert_eq!(current["status"], "pending");

    // second round: take over the table
    let (status, outcome) = app
        .post(
            "/api/requests/action",
            &bruno,
            json!({ "requestId": request_id, "action": "acknowledge", "takeoverTable": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["request"]["status"], "in_progress");
    assert_eq!(outcome["request"]["assignedStaffId"], BRUNO);
    assert_eq!(outcome["request"]["assignedStaffName"], "Bruno");

    let (status, owner) = app
        .get(&format!("/api/tables/{LOCATION}/{T1}/owner"), &bruno)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(owner["owner"]["staffId"], BRUNO);
    assert_eq!(owner["shiftDate"], "2026-10-16");

    let (_, mine) = app
        .get(&format!("/api/assignments/mine?locationId={LOCATION}"), &bruno)
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["tableId"], T1);

    let (_, history) = app
        .get(&format!("/api/requests/{request_id}/history"), &bruno)
        .await;
    let actions: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["request_created", "request_acknowledged"]);
}

#[tokio::test]
async fn malformed_action_body_is_a_validation_failure() {
    let app = TestApp::new();
    let anna = app.waiter(ANNA, "Anna");

    let (status, body) = app
        .post(
            "/api/requests/action",
            &anna,
            json!({ "requestId": 1, "action": "teleport" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, body) = app
        .post("/api/requests/action", &anna, json!({ "action": "acknowledge" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn action_failures_use_the_action_body() {
    let app = TestApp::new();
    let anna = app.waiter(ANNA, "Anna");
    let request_id = app.call_waiter(T2).await;

    let (status, _) = app
        .post(
            "/api/requests/action",
            &anna,
            json!({ "requestId": request_id, "action": "acknowledge" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/requests/action",
            &anna,
            json!({ "requestId": request_id, "action": "cancel" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "invalid_transition");

    let (status, body) = app
        .post(
            "/api/requests/action",
            &anna,
            json!({ "requestId": 424242, "action": "complete" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    // Bruno neither holds the request nor owns the table
    let (status, body) = app
        .post(
            "/api/requests/action",
            &app.waiter(BRUNO, "Bruno"),
            json!({ "requestId": request_id, "action": "complete" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not_owner");
}

#[tokio::test]
async fn list_filters_by_status_and_caller() {
    let app = TestApp::new();
    let anna = app.waiter(ANNA, "Anna");

    let (status, _) = app
        .post(
            "/api/assignments/self",
            &anna,
            json!({ "locationId": LOCATION, "tableId": T1 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let on_anna_table = app.call_waiter(T1).await;
    let elsewhere = app.call_waiter(T2).await;

    let (_, all) = app.get("/api/requests?status=pending", &anna).await;
    let ids: Vec<i64> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![on_anna_table, elsewhere]);

    let (_, mine) = app.get("/api/requests?onlyMine=true", &anna).await;
    let ids: Vec<i64> = mine
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![on_anna_table]);

    let (_, done) = app.get("/api/requests?status=completed", &anna).await;
    assert!(done.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn grant_conflict_and_revoke() {
    let app = TestApp::new();
    let manager = app.manager();

    let (_, granted) = app
        .post(
            "/api/assignments",
            &manager,
            json!({ "staffId": ANNA, "locationId": LOCATION, "sectionId": SECTION }),
        )
        .await;
    let assignment_id = granted["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            "/api/assignments",
            &manager,
            json!({ "staffId": BRUNO, "locationId": LOCATION, "sectionId": SECTION }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");

    let (status, body) = app
        .post(
            "/api/assignments",
            &manager,
            json!({ "staffId": BRUNO, "locationId": LOCATION, "sectionId": SECTION, "tableId": T1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    let uri = format!("/api/assignments/{assignment_id}");
    let (status, revoked) = app.send("DELETE", &uri, Some(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revoked["id"], assignment_id);

    let (status, body) = app.send("DELETE", &uri, Some(&manager), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");

    let (_, roster) = app
        .get(&format!("/api/assignments?locationId={LOCATION}"), &manager)
        .await;
    assert!(roster.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_validates_input() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/requests",
            &app.guest(),
            json!({
                "locationId": LOCATION,
                "tableId": T1,
                "kind": "assistance",
                "note": "x".repeat(501)
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    let (status, _) = app
        .post(
            "/api/requests",
            &app.guest(),
            json!({ "locationId": LOCATION, "tableId": 999, "kind": "assistance" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_acknowledges_have_one_winner() {
    let app = TestApp::new();
    let request_id = app.call_waiter(T2).await;
    let anna = app.waiter(ANNA, "Anna");
    let bruno = app.waiter(BRUNO, "Bruno");

    let body = json!({ "requestId": request_id, "action": "acknowledge" });
    let (a, b) = tokio::join!(
        app.post("/api/requests/action", &anna, body.clone()),
        app.post("/api/requests/action", &bruno, body.clone()),
    );

    let successes = [&a, &b]
        .iter()
        .filter(|(_, body)| body["success"] == true)
        .count();
    assert_eq!(successes, 1);

    let loser = if a.1["success"] == true { &b } else { &a };
    assert_eq!(loser.0, StatusCode::CONFLICT);
    assert_eq!(loser.1["error"], "invalid_transition");

    let (_, current) = app.get(&format!("/api/requests/{request_id}"), &anna).await;
    let winner = if a.1["success"] == true { ANNA } else { BRUNO };
    assert_eq!(current["assignedStaffId"], winner);
}
