//! Community feed API handlers

use crate::api::{ApiResponse, MessageResponse, PageQuery};
use crate::domain::{CreatePostInput, StringUuid};
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
    Json(input): Json<CreatePostInput>,
) -> Result<impl IntoResponse> {
    let post = state
        .community_service()
        .create(&scope, input, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(post))))
}

pub async fn list<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = state.community_service().list(&scope, query.into()).await?;
    Ok(Json(ApiResponse::page(page)))
}

pub async fn toggle_like<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let post = state
        .community_service()
        .toggle_like(&scope, id, user.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(post)))
}

pub async fn delete<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    state
        .community_service()
        .delete(&scope, id, user.user_id, user.role)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Post deleted successfully",
    ))))
}
