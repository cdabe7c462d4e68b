//! Context resolution, role gates and the response envelope

use super::{get_json, post_json, send_with_headers, Caller, TestAppState};
use crate::api::access_token;
use axum::http::{Method, StatusCode};
use ecclesia_core::domain::{Role, StringUuid};
use pretty_assertions::assert_eq;
use serde_json::json;

fn sermon_body() -> serde_json::Value {
    json!({
        "title": "The Good Shepherd",
        "speaker": "Pastor Adaeze",
        "date": "2026-03-01T10:00:00Z",
        "tags": ["psalms"]
    })
}

#[tokio::test]
async fn test_health_is_open() {
    let state = TestAppState::new();
    let app = state.router();

    let response = get_json(&app, "/health", &Caller::anonymous()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");

    let response = get_json(&app, "/ready", &Caller::anonymous()).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_disabled_is_not_found() {
    let state = TestAppState::new();
    let app = state.router();

    let response = get_json(&app, "/metrics", &Caller::anonymous()).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let state = TestAppState::new();
    let app = state.router();

    let response = send_with_headers(
        &app,
        Method::GET,
        "/health",
        &Caller::anonymous(),
        None,
        &[("x-request-id", "req-42")],
    )
    .await;
    assert_eq!(response.headers["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_request_id_is_generated_when_absent() {
    let state = TestAppState::new();
    let app = state.router();

    let response = get_json(&app, "/api/v1/sermons", &Caller::anonymous()).await;
    let id = response.headers["x-request-id"].to_str().unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_missing_tenant_is_bad_request() {
    let state = TestAppState::new();
    let app = state.router();
    let platform_token = access_token(StringUuid::new_v4(), None, Role::SuperAdmin);

    let response = get_json(&app, "/api/v1/sermons", &Caller::with_token(&platform_token)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["message"], "Tenant ID is required");
}

#[tokio::test]
async fn test_missing_tenant_checked_before_token() {
    let state = TestAppState::new();
    let app = state.router();

    let response = get_json(&app, "/api/v1/sermons", &Caller::anonymous()).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_tenant_used_when_header_absent() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (_, token) = state.principal(&church, Role::Member, "Lydia").await;

    let response = get_json(&app, "/api/v1/sermons", &Caller::with_token(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_tenant_mismatch_is_forbidden() {
    let state = TestAppState::new();
    let app = state.router();
    let grace = state.create_church("Grace Chapel").await;
    let hope = state.create_church("Hope Fellowship").await;
    let (_, token) = state.principal(&grace, Role::ChurchAdmin, "Deborah").await;

    let caller = Caller::with_token(&token).tenant_header(hope.id);
    let response = get_json(&app, "/api/v1/sermons", &caller).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"]["message"], "Tenant mismatch");
}

#[tokio::test]
async fn test_super_admin_acts_in_header_tenant() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let platform_token = access_token(StringUuid::new_v4(), None, Role::SuperAdmin);

    let caller = Caller::with_token(&platform_token).tenant_header(church.id);
    let response = post_json(&app, "/api/v1/sermons", &caller, sermon_body()).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["tenantId"], church.id.to_string());
}

#[tokio::test]
async fn test_member_cannot_create_sermon() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (_, token) = state.principal(&church, Role::Member, "Lydia").await;

    let response = post_json(
        &app,
        "/api/v1/sermons",
        &Caller::member(&token, &church),
        sermon_body(),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"]["message"], "Insufficient permissions");
}

#[tokio::test]
async fn test_role_gates_are_sets_not_levels() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (_, leader) = state.principal(&church, Role::Leader, "Barak").await;
    let (_, clergy) = state.principal(&church, Role::Clergy, "Samuel").await;

    // Leaders organize events but do not preach
    let event = json!({
        "title": "Choir Rehearsal",
        "description": "Weekly practice",
        "startDate": "2099-05-01T18:00:00Z",
        "endDate": "2099-05-01T20:00:00Z",
        "location": "Sanctuary"
    });
    let response = post_json(&app, "/api/v1/events", &Caller::member(&leader, &church), event).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = post_json(
        &app,
        "/api/v1/sermons",
        &Caller::member(&leader, &church),
        sermon_body(),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Clergy may preach but giving stats belong to the church admin alone
    let response = post_json(
        &app,
        "/api/v1/sermons",
        &Caller::member(&clergy, &church),
        sermon_body(),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = get_json(&app, "/api/v1/give/stats", &Caller::member(&clergy, &church)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_error_envelope_carries_path() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (_, token) = state.principal(&church, Role::Member, "Lydia").await;

    let path = format!("/api/v1/sermons/{}", StringUuid::new_v4());
    let response = get_json(&app, &path, &Caller::member(&token, &church)).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"]["statusCode"], 404);
    assert_eq!(response.body["error"]["message"], "Sermon not found");
    assert_eq!(response.body["error"]["path"], path);
    assert!(response.body["error"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let state = TestAppState::new();
    let app = state.router();

    let response = get_json(&app, "/api/v1/hymnals", &Caller::anonymous()).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"]["path"], "/api/v1/hymnals");
}

#[tokio::test]
async fn test_malformed_json_uses_envelope() {
    let state = TestAppState::new();
    let app = state.router();

    let response = send_with_headers(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        &Caller::anonymous(),
        None,
        &[("content-type", "application/json")],
    )
    .await;

    assert!(response.status.is_client_error());
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"]["path"], "/api/v1/auth/login");
}
