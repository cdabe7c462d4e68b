//! Registration, login and token lifecycle over HTTP

use super::{get_json, post_json, Caller, TestAppState};
use axum::http::StatusCode;
use ecclesia_core::domain::{StringUuid, UserStatus};
use ecclesia_core::repository::UserRepository;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn registration(join_code: &str, email: &str) -> Value {
    json!({
        "firstName": "Ruth",
        "lastName": "Moabite",
        "email": email,
        "password": "gleaning-fields",
        "joinCode": join_code
    })
}

#[tokio::test]
async fn test_register_with_join_code() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        &Caller::anonymous(),
        registration(&church.join_code, "Ruth@Grace.org"),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    let data = &response.body["data"];
    assert!(data["accessToken"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(data["refreshToken"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(data["user"]["email"], "ruth@grace.org");
    assert_eq!(data["user"]["role"], "member");
    assert_eq!(data["user"]["tenantId"], church.id.to_string());
    assert!(data["user"].get("passwordHash").is_none());

    let tenant = state.tenant_service.get(church.id).await.unwrap();
    assert_eq!(tenant.member_count, 1);

    let sent = state.email.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ruth@grace.org");

    let joined = state.queue.jobs_named("member.joined.tenant").await;
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].queue, "notifications");
}

#[tokio::test]
async fn test_register_rejects_unknown_join_code() {
    let state = TestAppState::new();
    let app = state.router();

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        &Caller::anonymous(),
        registration("NOPE1234", "ruth@grace.org"),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"]["message"], "Invalid join code");
}

#[tokio::test]
async fn test_register_twice_in_same_church_conflicts() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let body = registration(&church.join_code, "ruth@grace.org");

    let first = post_json(&app, "/api/v1/auth/register", &Caller::anonymous(), body.clone()).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = post_json(&app, "/api/v1/auth/register", &Caller::anonymous(), body).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_short_password_is_validation_error() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;

    let mut body = registration(&church.join_code, "ruth@grace.org");
    body["password"] = json!("short");
    let response = post_json(&app, "/api/v1/auth/register", &Caller::anonymous(), body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["statusCode"], 400);
}

#[tokio::test]
async fn test_login_wrong_password_changes_nothing() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;

    let registered = post_json(
        &app,
        "/api/v1/auth/register",
        &Caller::anonymous(),
        registration(&church.join_code, "ruth@grace.org"),
    )
    .await;
    let user_id: StringUuid = registered.body["data"]["user"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let before = state.user_repo.find_by_id(user_id).await.unwrap().unwrap();

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        &Caller::anonymous(),
        json!({"email": "ruth@grace.org", "password": "wrong-password"}),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["message"], "Invalid credentials");

    let after = state.user_repo.find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(after.refresh_token, before.refresh_token);
    assert_eq!(after.last_login_at, before.last_login_at);
}

#[tokio::test]
async fn test_login_unknown_email_is_unauthorized() {
    let state = TestAppState::new();
    let app = state.router();

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        &Caller::anonymous(),
        json!({"email": "nobody@grace.org", "password": "whatever-it-is"}),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_refresh_rotates_and_invalidates_previous_token() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;

    post_json(
        &app,
        "/api/v1/auth/register",
        &Caller::anonymous(),
        registration(&church.join_code, "ruth@grace.org"),
    )
    .await;
    let login = post_json(
        &app,
        "/api/v1/auth/login",
        &Caller::anonymous(),
        json!({"email": "ruth@grace.org", "password": "gleaning-fields"}),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    let old_refresh = login.body["data"]["refreshToken"].as_str().unwrap().to_string();

    let rotated = post_json(
        &app,
        "/api/v1/auth/refresh",
        &Caller::anonymous(),
        json!({"refreshToken": old_refresh}),
    )
    .await;
    assert_eq!(rotated.status, StatusCode::OK);
    let new_refresh = rotated.body["data"]["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, old_refresh);

    let replay = post_json(
        &app,
        "/api/v1/auth/refresh",
        &Caller::anonymous(),
        json!({"refreshToken": old_refresh}),
    )
    .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    let again = post_json(
        &app,
        "/api/v1/auth/refresh",
        &Caller::anonymous(),
        json!({"refreshToken": new_refresh}),
    )
    .await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;

    let registered = post_json(
        &app,
        "/api/v1/auth/register",
        &Caller::anonymous(),
        registration(&church.join_code, "ruth@grace.org"),
    )
    .await;
    let access = registered.body["data"]["accessToken"].as_str().unwrap();

    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        &Caller::anonymous(),
        json!({"refreshToken": access}),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_is_idempotent_and_revokes_refresh() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;

    let registered = post_json(
        &app,
        "/api/v1/auth/register",
        &Caller::anonymous(),
        registration(&church.join_code, "ruth@grace.org"),
    )
    .await;
    let access = registered.body["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh = registered.body["data"]["refreshToken"].as_str().unwrap().to_string();
    let caller = Caller::with_token(&access);

    for _ in 0..2 {
        let response = post_json(&app, "/api/v1/auth/logout", &caller, json!({})).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        &Caller::anonymous(),
        json!({"refreshToken": refresh}),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_token() {
    let state = TestAppState::new();
    let app = state.router();

    let response = get_json(&app, "/api/v1/auth/me", &Caller::anonymous()).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = get_json(&app, "/api/v1/auth/me", &Caller::with_token("not-a-jwt")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_email_activates_and_welcomes() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;

    let registered = post_json(
        &app,
        "/api/v1/auth/register",
        &Caller::anonymous(),
        registration(&church.join_code, "ruth@grace.org"),
    )
    .await;
    let access = registered.body["data"]["accessToken"].as_str().unwrap().to_string();
    let user_id: StringUuid = registered.body["data"]["user"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let code = state
        .user_repo
        .find_by_id(user_id)
        .await
        .unwrap()
        .unwrap()
        .email_verification_code
        .unwrap();

    let caller = Caller::with_token(&access);
    let wrong = post_json(&app, "/api/v1/auth/verify-email", &caller, json!({"code": "000000"})).await;
    if code != "000000" {
        assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    }

    let response = post_json(&app, "/api/v1/auth/verify-email", &caller, json!({"code": code})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["emailVerified"], true);

    let user = state.user_repo.find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(user.status, UserStatus::Active);

    let sent = state.email.sent().await;
    assert!(sent.iter().any(|m| m.subject == "Welcome to Grace Chapel"));

    let again = post_json(&app, "/api/v1/auth/verify-email", &caller, json!({"code": code})).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
}
