//! Small group API handlers

use crate::api::{ApiResponse, MessageResponse, PageQuery};
use crate::domain::{CreateGroupInput, StringUuid, UpdateGroupInput};
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
    Json(input): Json<CreateGroupInput>,
) -> Result<impl IntoResponse> {
    let group = state
        .group_service()
        .create(&scope, input, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(group))))
}

pub async fn list<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = state.group_service().list(&scope, query.into()).await?;
    Ok(Json(ApiResponse::page(page)))
}

pub async fn mine<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    let groups = state.group_service().mine(&scope, user.user_id).await?;
    Ok(Json(ApiResponse::ok(groups)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let group = state.group_service().get(&scope, id).await?;
    Ok(Json(ApiResponse::ok(group)))
}

pub async fn update<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
    Json(input): Json<UpdateGroupInput>,
) -> Result<impl IntoResponse> {
    let group = state
        .group_service()
        .update(&scope, id, input, user.user_id, user.role)
        .await?;
    Ok(Json(ApiResponse::ok(group)))
}

pub async fn join<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let group = state.group_service().join(&scope, id, user.user_id).await?;
    Ok(Json(ApiResponse::ok(group)))
}

pub async fn leave<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let group = state.group_service().leave(&scope, id, user.user_id).await?;
    Ok(Json(ApiResponse::ok(group)))
}

pub async fn delete<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    state
        .group_service()
        .delete(&scope, id, user.user_id, user.role)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Group deleted successfully",
    ))))
}
