//! Sermon API handlers

use crate::api::{ApiResponse, MessageResponse};
use crate::domain::{CreateSermonInput, SermonQuery, StringUuid, UpdateSermonInput};
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
    Json(input): Json<CreateSermonInput>,
) -> Result<impl IntoResponse> {
    let sermon = state
        .sermon_service()
        .create(&scope, input, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(sermon))))
}

pub async fn list<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Query(query): Query<SermonQuery>,
) -> Result<impl IntoResponse> {
    let page = state.sermon_service().list(&scope, query).await?;
    Ok(Json(ApiResponse::page(page)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let sermon = state.sermon_service().get(&scope, id).await?;
    Ok(Json(ApiResponse::ok(sermon)))
}

pub async fn update<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
    Json(input): Json<UpdateSermonInput>,
) -> Result<impl IntoResponse> {
    let sermon = state.sermon_service().update(&scope, id, input).await?;
    Ok(Json(ApiResponse::ok(sermon)))
}

pub async fn publish<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let sermon = state
        .sermon_service()
        .publish(&scope, id, user.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(sermon)))
}

pub async fn delete<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    state.sermon_service().delete(&scope, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Sermon deleted successfully",
    ))))
}

pub async fn speakers<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
) -> Result<impl IntoResponse> {
    let speakers = state.sermon_service().speakers(&scope).await?;
    Ok(Json(ApiResponse::ok(speakers)))
}

pub async fn tags<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
) -> Result<impl IntoResponse> {
    let tags = state.sermon_service().tags(&scope).await?;
    Ok(Json(ApiResponse::ok(tags)))
}
