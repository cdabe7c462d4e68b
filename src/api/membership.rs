//! Membership API handlers

use crate::api::{ApiResponse, PageQuery};
use crate::domain::{StringUuid, UpdateMembershipInput};
use crate::error::Result;
use crate::repository::TenantScope;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};

pub async fn list<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = state.membership_service().list(&scope, query.into()).await?;
    Ok(Json(ApiResponse::page(page)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(user_id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let membership = state.membership_service().get(&scope, user_id).await?;
    Ok(Json(ApiResponse::ok(membership)))
}

pub async fn update<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(user_id): Path<StringUuid>,
    Json(input): Json<UpdateMembershipInput>,
) -> Result<impl IntoResponse> {
    let membership = state
        .membership_service()
        .update(&scope, user_id, input)
        .await?;
    Ok(Json(ApiResponse::ok(membership)))
}
