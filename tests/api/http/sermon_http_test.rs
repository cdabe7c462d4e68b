//! Sermon library over HTTP: tenant isolation, paging and publishing

use super::{delete_json, get_json, post_json, put_json, send, Caller, TestAppState};
use axum::http::{Method, StatusCode};
use ecclesia_core::domain::Role;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn sermon(title: &str, speaker: &str, date: &str, tags: &[&str]) -> Value {
    json!({
        "title": title,
        "speaker": speaker,
        "date": date,
        "tags": tags,
        "duration": 35
    })
}

async fn create_sermon(app: &axum::Router, caller: &Caller, body: Value) -> String {
    let response = post_json(app, "/api/v1/sermons", caller, body).await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_and_get_counts_views() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (pastor_id, pastor) = state.principal(&church, Role::Clergy, "Samuel").await;
    let (_, member) = state.principal(&church, Role::Member, "Lydia").await;

    let id = create_sermon(
        &app,
        &Caller::member(&pastor, &church),
        sermon("Living Water", "Samuel", "2026-02-01T10:00:00Z", &["john"]),
    )
    .await;

    let path = format!("/api/v1/sermons/{}", id);
    let first = get_json(&app, &path, &Caller::member(&member, &church)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["data"]["title"], "Living Water");
    assert_eq!(first.body["data"]["createdBy"], pastor_id.to_string());
    assert_eq!(first.body["data"]["isPublished"], false);
    assert_eq!(first.body["data"]["viewCount"], 1);

    assert_eq!(first.body["data"]["date"], "2026-02-01T10:00:00.000Z");

    let second = get_json(&app, &path, &Caller::member(&member, &church)).await;
    assert_eq!(second.body["data"]["viewCount"], 2);
    // Views are not edits
    assert_eq!(second.body["data"]["updatedAt"], first.body["data"]["createdAt"]);
    assert_eq!(second.body["data"]["updatedAt"], first.body["data"]["updatedAt"]);
}

#[tokio::test]
async fn test_other_tenant_sermon_is_not_found() {
    let state = TestAppState::new();
    let app = state.router();
    let grace = state.create_church("Grace Chapel").await;
    let hope = state.create_church("Hope Fellowship").await;
    let (_, grace_pastor) = state.principal(&grace, Role::Clergy, "Samuel").await;
    let (_, hope_admin) = state.principal(&hope, Role::ChurchAdmin, "Miriam").await;

    let id = create_sermon(
        &app,
        &Caller::member(&grace_pastor, &grace),
        sermon("Living Water", "Samuel", "2026-02-01T10:00:00Z", &[]),
    )
    .await;
    let path = format!("/api/v1/sermons/{}", id);
    let hope_caller = Caller::member(&hope_admin, &hope);

    let response = get_json(&app, &path, &hope_caller).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = put_json(&app, &path, &hope_caller, json!({"title": "Hijacked"})).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = delete_json(&app, &path, &hope_caller).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let list = get_json(&app, "/api/v1/sermons", &hope_caller).await;
    assert_eq!(list.body["meta"]["total"], 0);

    // Still intact for its owner
    let response = get_json(&app, &path, &Caller::member(&grace_pastor, &grace)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["title"], "Living Water");
}

#[tokio::test]
async fn test_list_pagination_is_clamped() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (_, pastor) = state.principal(&church, Role::Clergy, "Samuel").await;
    let caller = Caller::member(&pastor, &church);

    for day in 1..=3 {
        create_sermon(
            &app,
            &caller,
            sermon(
                &format!("Week {}", day),
                "Samuel",
                &format!("2026-01-0{}T10:00:00Z", day),
                &[],
            ),
        )
        .await;
    }

    let response = get_json(&app, "/api/v1/sermons?page=0&limit=1000", &caller).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["meta"],
        json!({"total": 3, "page": 1, "limit": 100, "totalPages": 1})
    );

    let response = get_json(&app, "/api/v1/sermons?page=2&limit=2", &caller).await;
    assert_eq!(
        response.body["meta"],
        json!({"total": 3, "page": 2, "limit": 2, "totalPages": 2})
    );
    let data = response.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    // Newest date first, so the last page holds the oldest sermon
    assert_eq!(data[0]["title"], "Week 1");
}

#[tokio::test]
async fn test_list_filters_by_speaker_and_tag() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (_, pastor) = state.principal(&church, Role::Clergy, "Samuel").await;
    let caller = Caller::member(&pastor, &church);

    create_sermon(&app, &caller, sermon("A", "Samuel", "2026-01-01T10:00:00Z", &["grace"])).await;
    create_sermon(&app, &caller, sermon("B", "Hannah", "2026-01-02T10:00:00Z", &["grace", "hope"])).await;
    create_sermon(&app, &caller, sermon("C", "Hannah", "2026-01-03T10:00:00Z", &["faith"])).await;

    let response = get_json(&app, "/api/v1/sermons?speaker=Hannah", &caller).await;
    assert_eq!(response.body["meta"]["total"], 2);

    let response = get_json(&app, "/api/v1/sermons?tag=grace", &caller).await;
    assert_eq!(response.body["meta"]["total"], 2);

    let speakers = get_json(&app, "/api/v1/sermons/speakers", &caller).await;
    assert_eq!(speakers.body["data"], json!(["Hannah", "Samuel"]));

    let tags = get_json(&app, "/api/v1/sermons/tags", &caller).await;
    assert_eq!(tags.body["data"], json!(["faith", "grace", "hope"]));
}

#[tokio::test]
async fn test_publish_survives_queue_failure() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (_, pastor) = state.principal(&church, Role::Clergy, "Samuel").await;
    let caller = Caller::member(&pastor, &church);

    let id = create_sermon(
        &app,
        &caller,
        sermon("Living Water", "Samuel", "2026-02-01T10:00:00Z", &[]),
    )
    .await;

    state.queue.set_failing(true);
    let path = format!("/api/v1/sermons/{}/publish", id);
    let response = send(&app, Method::PATCH, &path, &caller, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["isPublished"], true);
    assert!(response.body["data"]["publishedAt"].is_string());
    assert!(state.queue.jobs_named("sermon.published").await.is_empty());
}

#[tokio::test]
async fn test_publish_twice_emits_once() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (_, pastor) = state.principal(&church, Role::Clergy, "Samuel").await;
    let caller = Caller::member(&pastor, &church);

    let id = create_sermon(
        &app,
        &caller,
        sermon("Living Water", "Samuel", "2026-02-01T10:00:00Z", &[]),
    )
    .await;
    let path = format!("/api/v1/sermons/{}/publish", id);

    let first = send(&app, Method::PATCH, &path, &caller, None).await;
    assert_eq!(first.status, StatusCode::OK);
    let published_at = first.body["data"]["publishedAt"].clone();

    let second = send(&app, Method::PATCH, &path, &caller, None).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["data"]["publishedAt"], published_at);

    let jobs = state.queue.jobs_named("sermon.published").await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].payload["sermonId"], id);
    assert_eq!(jobs[0].payload["tenantId"], church.id.to_string());
}

#[tokio::test]
async fn test_only_admin_deletes_sermon() {
    let state = TestAppState::new();
    let app = state.router();
    let church = state.create_church("Grace Chapel").await;
    let (_, pastor) = state.principal(&church, Role::Clergy, "Samuel").await;
    let (_, admin) = state.principal(&church, Role::ChurchAdmin, "Deborah").await;

    let id = create_sermon(
        &app,
        &Caller::member(&pastor, &church),
        sermon("Living Water", "Samuel", "2026-02-01T10:00:00Z", &[]),
    )
    .await;
    let path = format!("/api/v1/sermons/{}", id);

    let response = delete_json(&app, &path, &Caller::member(&pastor, &church)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = delete_json(&app, &path, &Caller::member(&admin, &church)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["message"], "Sermon deleted successfully");

    let response = delete_json(&app, &path, &Caller::member(&admin, &church)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
