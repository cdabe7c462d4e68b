//! Authentication API handlers

use crate::api::{ApiResponse, MessageResponse};
use crate::domain::{LoginInput, RefreshInput, RegisterInput, VerifyEmailInput};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::HasServices;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

pub async fn register<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<RegisterInput>,
) -> Result<impl IntoResponse> {
    let response = state.auth_service().register(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(response))))
}

pub async fn login<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse> {
    let response = state.auth_service().login(input).await?;
    Ok(Json(ApiResponse::ok(response)))
}

pub async fn refresh<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<RefreshInput>,
) -> Result<impl IntoResponse> {
    let tokens = state.auth_service().refresh(&input.refresh_token).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

pub async fn logout<S: HasServices>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    state.auth_service().logout(user.user_id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

pub async fn me<S: HasServices>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    let user = state.auth_service().me(user.user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn verify_email<S: HasServices>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<VerifyEmailInput>,
) -> Result<impl IntoResponse> {
    input.validate()?;
    let user = state
        .auth_service()
        .verify_email(user.user_id, &input.code)
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn resend_verification<S: HasServices>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    state.auth_service().resend_verification(user.user_id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Verification code sent",
    ))))
}
