//! Prayer API handlers

use crate::api::{ApiResponse, PageQuery};
use crate::domain::{CreatePrayerInput, StringUuid};
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
    Json(input): Json<CreatePrayerInput>,
) -> Result<impl IntoResponse> {
    let prayer = state
        .prayer_service()
        .create(&scope, input, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(prayer))))
}

pub async fn list<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = state.prayer_service().list(&scope, query.into()).await?;
    Ok(Json(ApiResponse::page(page)))
}

pub async fn mine<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    let prayers = state.prayer_service().mine(&scope, user.user_id).await?;
    Ok(Json(ApiResponse::ok(prayers)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let prayer = state.prayer_service().get(&scope, id).await?;
    Ok(Json(ApiResponse::ok(prayer)))
}

pub async fn pray<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let prayer = state
        .prayer_service()
        .pray(&scope, id, user.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(prayer)))
}

pub async fn mark_answered<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let prayer = state
        .prayer_service()
        .mark_answered(&scope, id, user.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(prayer)))
}
