//! Church (tenant) API handlers

use crate::api::{ApiResponse, MessageResponse, PageQuery};
use crate::domain::{
    CreateJoinCodeInput, CreateTenantInput, JoinTenantInput, Role, StringUuid, Tenant,
    TenantBranding, UpdateTenantInput,
};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequestContext};
use crate::policy::authorize_tenant_target;
use crate::repository::TenantScope;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use validator::Validate;

/// What an anonymous holder of a join code may see before registering
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantPreview {
    pub id: StringUuid,
    pub name: String,
    pub slug: String,
    pub denomination: Option<String>,
    pub branding: TenantBranding,
    pub role: Role,
}

/// Checks the path id against the caller's tenant and binds a scope for it
fn target_scope(context: &RequestContext, user: &CurrentUser, id: &str) -> Result<TenantScope> {
    authorize_tenant_target(user.0.role, context.tenant_id.as_deref(), id)?;
    StringUuid::parse_str(id)
        .map(TenantScope::bind)
        .map_err(|_| AppError::BadRequest("Invalid tenant ID".to_string()))
}

pub async fn create<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<CreateTenantInput>,
) -> Result<impl IntoResponse> {
    let tenant = state.tenant_service().create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tenant))))
}

pub async fn join<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<JoinTenantInput>,
) -> Result<impl IntoResponse> {
    input.validate()?;
    let resolved = state
        .tenant_service()
        .resolve_join_code(&input.join_code)
        .await?;
    let Tenant {
        id,
        name,
        slug,
        denomination,
        branding,
        ..
    } = resolved.tenant;
    Ok(Json(ApiResponse::ok(TenantPreview {
        id,
        name,
        slug,
        denomination,
        branding,
        role: resolved.role,
    })))
}

pub async fn list<S: HasServices>(
    State(state): State<S>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = state.tenant_service().list(query.into()).await?;
    Ok(Json(ApiResponse::page(page)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    context: RequestContext,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let scope = target_scope(&context, &user, &id)?;
    let tenant = state.tenant_service().get(scope.tenant_id()).await?;
    Ok(Json(ApiResponse::ok(tenant)))
}

pub async fn get_by_slug<S: HasServices>(
    State(state): State<S>,
    context: RequestContext,
    user: CurrentUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let tenant = state.tenant_service().get_by_slug(&slug).await?;
    authorize_tenant_target(user.0.role, context.tenant_id.as_deref(), &tenant.id.to_string())?;
    Ok(Json(ApiResponse::ok(tenant)))
}

pub async fn update<S: HasServices>(
    State(state): State<S>,
    context: RequestContext,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateTenantInput>,
) -> Result<impl IntoResponse> {
    let scope = target_scope(&context, &user, &id)?;
    let tenant = state
        .tenant_service()
        .update(scope.tenant_id(), input, user.0.role)
        .await?;
    Ok(Json(ApiResponse::ok(tenant)))
}

pub async fn delete<S: HasServices>(
    State(state): State<S>,
    context: RequestContext,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let scope = target_scope(&context, &user, &id)?;
    state.tenant_service().delete(scope.tenant_id()).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Church deleted successfully",
    ))))
}

pub async fn regenerate_join_code<S: HasServices>(
    State(state): State<S>,
    context: RequestContext,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let scope = target_scope(&context, &user, &id)?;
    let tenant = state
        .tenant_service()
        .regenerate_join_code(scope.tenant_id())
        .await?;
    Ok(Json(ApiResponse::ok(tenant)))
}

pub async fn list_join_codes<S: HasServices>(
    State(state): State<S>,
    context: RequestContext,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let scope = target_scope(&context, &user, &id)?;
    let codes = state.tenant_service().list_join_codes(&scope).await?;
    Ok(Json(ApiResponse::ok(codes)))
}

pub async fn create_join_code<S: HasServices>(
    State(state): State<S>,
    context: RequestContext,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<CreateJoinCodeInput>,
) -> Result<impl IntoResponse> {
    let scope = target_scope(&context, &user, &id)?;
    let code = state
        .tenant_service()
        .create_join_code(&scope, input, user.0.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(code))))
}

pub async fn deactivate_join_code<S: HasServices>(
    State(state): State<S>,
    context: RequestContext,
    user: CurrentUser,
    Path((id, code_id)): Path<(String, StringUuid)>,
) -> Result<impl IntoResponse> {
    let scope = target_scope(&context, &user, &id)?;
    state
        .tenant_service()
        .deactivate_join_code(&scope, code_id)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Join code deactivated",
    ))))
}
