//! Church event API handlers

use crate::api::{ApiResponse, MessageResponse, PageQuery};
use crate::domain::{CreateEventInput, StringUuid};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::repository::TenantScope;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub async fn create<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateEventInput>,
) -> Result<impl IntoResponse> {
    let event = state
        .church_event_service()
        .create(&scope, input, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(event))))
}

pub async fn list<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .church_event_service()
        .list_upcoming(&scope, query.into())
        .await?;
    Ok(Json(ApiResponse::page(page)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let event = state.church_event_service().get(&scope, id).await?;
    Ok(Json(ApiResponse::ok(event)))
}

pub async fn register<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let event = state
        .church_event_service()
        .register(&scope, id, user.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(event)))
}

pub async fn unregister<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let event = state
        .church_event_service()
        .unregister(&scope, id, user.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(event)))
}

pub async fn delete<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    state.church_event_service().delete(&scope, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Event deleted successfully",
    ))))
}
