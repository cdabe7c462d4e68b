//! Giving API handlers

use crate::api::{ApiResponse, PageQuery};
use crate::domain::{CreateDonationInput, StringUuid, UpdateDonationStatusInput};
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

pub async fn donate<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateDonationInput>,
) -> Result<impl IntoResponse> {
    let donation = state
        .donation_service()
        .donate(&scope, input, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(donation))))
}

pub async fn mine<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .donation_service()
        .mine(&scope, user.user_id, query.into())
        .await?;
    Ok(Json(ApiResponse::page(page)))
}

pub async fn stats<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
) -> Result<impl IntoResponse> {
    let stats = state.donation_service().stats(&scope).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

pub async fn update_status<S: HasServices>(
    State(state): State<S>,
    scope: TenantScope,
    Path(id): Path<StringUuid>,
    Json(input): Json<UpdateDonationStatusInput>,
) -> Result<impl IntoResponse> {
    let donation = state
        .donation_service()
        .update_status(&scope, id, input.status)
        .await?;
    Ok(Json(ApiResponse::ok(donation)))
}
