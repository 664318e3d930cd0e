//! End-to-end tests against the router, without binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use focusloop_core::storage::Database;
use focusloop_core::{FixedClock, MemoryStore};
use focusloop_server::{app, ServerState};
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn today() -> NaiveDate {
    // A Wednesday.
    NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
}

fn memory_app() -> Router {
    app(ServerState::new(MemoryStore::new(), Arc::new(FixedClock::new(today()))))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_session(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::post("/api/sessions")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn health_reports_ok() {
    let app = memory_app();
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn created_session_is_returned_by_range_query() {
    let app = memory_app();
    let (status, created) = post_session(
        &app,
        json!({ "sessionType": "work", "duration": 25, "wasCompleted": true, "date": "2024-06-10" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["sessionType"], "work");
    assert_eq!(created["duration"], 25);
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(created.get("completedAt").is_some());

    let (status, records) = get(&app, "/api/sessions/range?startDate=2024-06-10&endDate=2024-06-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records, json!([created]));

    let (_, outside) = get(&app, "/api/sessions/range?startDate=2024-06-11&endDate=2024-06-12").await;
    assert_eq!(outside, json!([]));
}

#[tokio::test]
async fn missing_was_completed_defaults_to_true() {
    let app = memory_app();
    let (status, created) = post_session(
        &app,
        json!({ "sessionType": "break", "duration": 5, "date": "2024-06-12" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["wasCompleted"], true);
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = memory_app();
    let bad = [
        json!({ "sessionType": "work", "duration": 0, "date": "2024-06-12" }),
        json!({ "sessionType": "work", "duration": -3, "date": "2024-06-12" }),
        json!({ "sessionType": "nap", "duration": 25, "date": "2024-06-12" }),
        json!({ "sessionType": "work", "duration": 25, "date": "June 12" }),
        json!({ "duration": 25, "date": "2024-06-12" }),
    ];
    for body in bad {
        let (status, response) = post_session(&app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "Invalid session data" }));
    }

    let (_, records) = get(&app, "/api/sessions/today").await;
    assert_eq!(records, json!([]));
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = memory_app();
    let request = Request::post("/api/sessions")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid session data");
}

#[tokio::test]
async fn range_requires_both_bounds() {
    let app = memory_app();
    for uri in [
        "/api/sessions/range",
        "/api/sessions/range?startDate=2024-06-01",
        "/api/sessions/range?endDate=2024-06-01",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "startDate and endDate are required");
    }

    let (status, _) = get(&app, "/api/sessions/range?startDate=yesterday&endDate=2024-06-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn named_windows_follow_the_clock() {
    let app = memory_app();
    for date in ["2024-06-12", "2024-06-09", "2024-06-08", "2024-05-13", "2024-05-12"] {
        let (status, _) = post_session(
            &app,
            json!({ "sessionType": "work", "duration": 25, "date": date }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, today) = get(&app, "/api/sessions/today").await;
    assert_eq!(today.as_array().map(Vec::len), Some(1));

    // Sunday 2024-06-09 through today.
    let (_, week) = get(&app, "/api/sessions/week").await;
    assert_eq!(week.as_array().map(Vec::len), Some(2));

    // 2024-05-13 through today.
    let (_, month) = get(&app, "/api/sessions/month").await;
    assert_eq!(month.as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn insights_use_requested_goal() {
    let app = memory_app();
    for _ in 0..3 {
        post_session(
            &app,
            json!({ "sessionType": "work", "duration": 30, "date": "2024-06-12" }),
        )
        .await;
    }

    let (status, body) = get(&app, "/api/stats/insights?dailyGoal=6").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todaySessions"], 3);
    assert_eq!(body["dailyGoal"], 6);
    assert_eq!(body["goalProgress"], 50);
    assert_eq!(body["avgSessionLength"], 30);

    let (_, default_goal) = get(&app, "/api/stats/insights").await;
    assert_eq!(default_goal["dailyGoal"], 8);

    let (status, _) = get(&app, "/api/stats/insights?dailyGoal=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sqlite_backed_server_persists_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusloop.db");
    let clock = Arc::new(FixedClock::new(today()));

    {
        let app = app(ServerState::new(Database::open_at(&path).unwrap(), clock.clone()));
        let (status, _) = post_session(
            &app,
            json!({ "sessionType": "long_break", "duration": 15, "date": "2024-06-12" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let app = app(ServerState::new(Database::open_at(&path).unwrap(), clock));
    let (_, records) = get(&app, "/api/sessions/today").await;
    assert_eq!(records[0]["sessionType"], "long_break");
}
