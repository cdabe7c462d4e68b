//! Worship set API handlers

use crate::api::{ApiResponse, MessageResponse, PageQuery};
use crate::domain::{CreateWorshipSetInput, StringUuid, UpdateWorshipSetInput};
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
    Json(input): Json<CreateWorshipSetInput>,
) -> Result<impl IntoResponse> {
    let set = state
        .worship_service()
        .create(&scope, input, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(set))))
}

pub async fn list<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = state.worship_service().list(&scope, query.into()).await?;
    Ok(Json(ApiResponse::page(page)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let set = state.worship_service().get(&scope, id).await?;
    Ok(Json(ApiResponse::ok(set)))
}

pub async fn update<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
    Json(input): Json<UpdateWorshipSetInput>,
) -> Result<impl IntoResponse> {
    let set = state.worship_service().update(&scope, id, input).await?;
    Ok(Json(ApiResponse::ok(set)))
}

pub async fn publish<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let set = state
        .worship_service()
        .publish(&scope, id, user.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(set)))
}

pub async fn delete<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    state.worship_service().delete(&scope, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Worship set deleted successfully",
    ))))
}
