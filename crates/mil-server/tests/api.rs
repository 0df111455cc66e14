//! End-to-end tests for the dashboard API over a temp-dir project database.

use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use mil_config::AuthorityConfig;
use mil_core::authority::StaticPolicy;
use mil_db::service::MilService;
use mil_server::registry::{DB_FILENAME, ProjectEntry, Registry};
use mil_server::{AppState, build_router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const PROJECT_KEY: &str = "demo";

/// Seed a project database under a temp state dir, register it, and build
/// the router. The temp dir must outlive the returned router.
async fn test_app() -> (Router, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let state_dir = tmp.path().join("state");
    std::fs::create_dir_all(&state_dir).unwrap();

    let db_path = state_dir.join(DB_FILENAME);
    let svc = MilService::open_local(
        &db_path.to_string_lossy(),
        Box::new(StaticPolicy::default()),
    )
    .await
    .unwrap();
    svc.ensure_project(PROJECT_KEY, Some("Demo Project"), None)
        .await
        .unwrap();
    drop(svc);

    let mut registry = Registry::in_memory();
    registry
        .register(ProjectEntry {
            key: PROJECT_KEY.to_string(),
            name: "Demo Project".to_string(),
            description: None,
            path: None,
            state_dir,
        })
        .unwrap();

    let authority = AuthorityConfig {
        levels: HashMap::from([("alice".to_string(), 4), ("bob".to_string(), 2)]),
    };
    (build_router(AppState::new(registry, authority)), tmp)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post(app: &Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_endpoint() {
    let (app, _tmp) = test_app().await;
    let (status, body) = get(&app, "/__health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn unregistered_project_is_404() {
    let (app, _tmp) = test_app().await;
    let (status, _) = get(&app, "/api/milestones?project=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn milestone_create_and_list() {
    let (app, _tmp) = test_app().await;

    let (status, body) = post(
        &app,
        &format!("/api/milestones/create?projectKey={PROJECT_KEY}"),
        json!({"title": "Ship v1", "priority": 5, "expectedHours": 8.0}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["slug"], "ship-v1");

    let (status, body) = get(&app, &format!("/api/milestones?project={PROJECT_KEY}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["key"], PROJECT_KEY);
    assert_eq!(body["milestones"][0]["slug"], "ship-v1");
    assert_eq!(body["progress"]["total_count"], 1);
}

#[tokio::test]
async fn milestone_validation_error_is_400() {
    let (app, _tmp) = test_app().await;
    let (status, body) = post(
        &app,
        &format!("/api/milestones/create?projectKey={PROJECT_KEY}"),
        json!({"title": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn log_create_and_update() {
    let (app, _tmp) = test_app().await;
    post(
        &app,
        &format!("/api/milestones/create?projectKey={PROJECT_KEY}"),
        json!({"title": "Logged"}),
    )
    .await;

    let (status, body) = post(
        &app,
        &format!("/api/milestones/logs/create?projectKey={PROJECT_KEY}"),
        json!({"slug": "logged", "summary": "started", "author": "bob", "progress": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["log"]["sequence"], 1);

    let (status, body) = post(
        &app,
        &format!("/api/milestones/logs/update?projectKey={PROJECT_KEY}"),
        json!({"slug": "logged", "sequence": 1, "summary": "corrected"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["log"]["summary"], "corrected");
}

#[tokio::test]
async fn progress_reset_and_history() {
    let (app, _tmp) = test_app().await;
    let (status, body) = post(
        &app,
        &format!("/api/progress/reset?projectKey={PROJECT_KEY}"),
        json!({"label": "sprint 1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["label"], "sprint 1");

    let (status, body) = get(&app, &format!("/api/progress/history?project={PROJECT_KEY}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

async fn create_decision(app: &Router, title: &str, required_level: i64, maker: &str) -> i64 {
    let (status, body) = post(
        app,
        &format!("/api/decisions/create?projectKey={PROJECT_KEY}"),
        json!({
            "title": title,
            "decision": "because",
            "required_level": required_level,
            "maker": maker,
            "status": "accepted",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["decision_id"].as_i64().unwrap()
}

#[tokio::test]
async fn decision_create_detail_and_list() {
    let (app, _tmp) = test_app().await;
    let id = create_decision(&app, "Adopt libSQL", 2, "alice").await;

    let (status, body) = get(
        &app,
        &format!("/api/decisions/{id}?project={PROJECT_KEY}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Adopt libSQL");
    assert_eq!(body["maker_level"], 4);
    assert_eq!(body["overrides"], json!([]));

    let (status, body) = get(
        &app,
        &format!("/api/decisions?project={PROJECT_KEY}&maker=alice"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = get(&app, &format!("/api/decisions/999?project={PROJECT_KEY}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn override_gate_cycle_and_active_view() {
    let (app, _tmp) = test_app().await;
    let a = create_decision(&app, "A", 2, "alice").await;
    let b = create_decision(&app, "B", 2, "alice").await;
    let weak = create_decision(&app, "Weak", 1, "bob").await;

    // bob (level 2) cannot override a decision requiring 2.
    let (status, body) = post(
        &app,
        &format!("/api/decisions/override?projectKey={PROJECT_KEY}"),
        json!({"decision_id": weak, "overrides": [a]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("authority"));

    // alice's decision B overrides A.
    let (status, _) = post(
        &app,
        &format!("/api/decisions/override?projectKey={PROJECT_KEY}"),
        json!({"decision_id": b, "overrides": [a]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Closing the loop is rejected.
    let (status, body) = post(
        &app,
        &format!("/api/decisions/override?projectKey={PROJECT_KEY}"),
        json!({"decision_id": a, "overrides": [b]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cycle"));

    // Missing target maps to 404.
    let (status, _) = post(
        &app,
        &format!("/api/decisions/override?projectKey={PROJECT_KEY}"),
        json!({"decision_id": b, "overrides": [12345]}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, &format!("/api/decisions/active?project={PROJECT_KEY}")).await;
    assert_eq!(status, StatusCode::OK);
    let active: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_i64().unwrap())
        .collect();
    assert!(active.contains(&b));
    assert!(!active.contains(&a));
}

#[tokio::test]
async fn override_request_roundtrip() {
    let (app, _tmp) = test_app().await;
    let id = create_decision(&app, "Contested", 4, "alice").await;

    let (status, body) = post(
        &app,
        &format!("/api/decisions/override-request?projectKey={PROJECT_KEY}"),
        json!({"target_decision_id": id, "requester": "bob", "message": "reconsider"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn decision_link_and_milestone_filter() {
    let (app, _tmp) = test_app().await;
    post(
        &app,
        &format!("/api/milestones/create?projectKey={PROJECT_KEY}"),
        json!({"title": "Ship v1"}),
    )
    .await;
    let id = create_decision(&app, "Cut scope", 1, "alice").await;

    let (status, _) = post(
        &app,
        &format!("/api/decisions/link?projectKey={PROJECT_KEY}"),
        json!({"decision_id": id, "milestoneSlug": "ship-v1", "relation_type": "affects"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(
        &app,
        &format!("/api/decisions?project={PROJECT_KEY}&milestone=ship-v1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["milestone_count"], 1);
}

#[tokio::test]
async fn register_validates_state_dir() {
    let (app, tmp) = test_app().await;

    let (status, _) = post(&app, "/api/projects/register", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        &app,
        "/api/projects/register",
        json!({"projectKey": "nope", "stateDir": tmp.path().join("absent").to_string_lossy()}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("stateDir"));

    // Re-registering the seeded project succeeds and shows up in the list.
    let (status, _) = post(
        &app,
        "/api/projects/register",
        json!({
            "projectKey": PROJECT_KEY,
            "stateDir": tmp.path().join("state").to_string_lossy(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/api/projects").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["key"], PROJECT_KEY);
    assert_eq!(body[0]["name"], "Demo Project");
}

#[tokio::test]
async fn project_reset_clears_milestones() {
    let (app, _tmp) = test_app().await;
    post(
        &app,
        &format!("/api/milestones/create?projectKey={PROJECT_KEY}"),
        json!({"title": "Doomed"}),
    )
    .await;

    let (status, _) = post(
        &app,
        "/api/projects/reset",
        json!({"projectKey": PROJECT_KEY}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, &format!("/api/milestones?project={PROJECT_KEY}")).await;
    assert_eq!(body["milestones"], json!([]));
}
