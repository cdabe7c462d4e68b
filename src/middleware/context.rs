//! Request context resolution
//!
//! `resolve_context` is attached per route group with `route_layer`. It binds
//! the tenant header, authenticates the bearer token, reconciles the token's
//! tenant with the header and applies the group's role set, then stores one
//! immutable [`RequestContext`] for handlers to extract.

use super::metrics::RequestId;
use crate::domain::{Role, StringUuid};
use crate::error::AppError;
use crate::jwt::JwtManager;
use crate::policy::{authorize, AuthRequirement, RoutePolicy, TenantRequirement};
use crate::repository::TenantScope;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Authenticated caller, taken from a verified access token
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user_id: StringUuid,
    pub email: String,
    pub tenant_id: Option<String>,
    pub role: Role,
}

/// Resolved per-request context. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub request_id: String,
    /// Effective tenant after reconciliation
    pub tenant_id: Option<String>,
    pub user: Option<Principal>,
}

/// Effective tenant, copied onto the response for the error boundary's logs
#[derive(Debug, Clone)]
pub struct TenantTag(pub String);

/// Middleware state: the token verifier plus the route group's policy
#[derive(Clone)]
pub struct ContextGuard {
    jwt: JwtManager,
    policy: RoutePolicy,
}

impl ContextGuard {
    pub fn new(jwt: JwtManager, policy: RoutePolicy) -> Self {
        Self { jwt, policy }
    }
}

pub async fn resolve_context(
    State(guard): State<ContextGuard>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    match resolve(request.headers(), &guard.jwt, &guard.policy, request_id) {
        Ok(context) => {
            let tag = context.tenant_id.clone().map(TenantTag);
            request.extensions_mut().insert(context);
            let mut response = next.run(request).await;
            if let Some(tag) = tag {
                response.extensions_mut().insert(tag);
            }
            response
        }
        Err(error) => error.into_response(),
    }
}

/// The resolution chain: tenant binding, authentication, reconciliation,
/// authorization. Stops at the first failure.
pub fn resolve(
    headers: &HeaderMap,
    jwt: &JwtManager,
    policy: &RoutePolicy,
    request_id: String,
) -> Result<RequestContext, AppError> {
    let header_tenant = headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    if header_tenant.is_none() && policy.tenant == TenantRequirement::Required {
        return Err(AppError::BadRequest("Tenant ID is required".to_string()));
    }

    if policy.auth == AuthRequirement::Public {
        return Ok(RequestContext {
            request_id,
            tenant_id: header_tenant,
            user: None,
        });
    }

    let principal = authenticate(headers, jwt)?;

    let tenant_id = match (&principal.tenant_id, header_tenant) {
        (Some(token_tenant), Some(header)) if *token_tenant != header => {
            return Err(AppError::Forbidden("Tenant mismatch".to_string()));
        }
        (Some(token_tenant), _) => Some(token_tenant.clone()),
        (None, header) => header,
    };

    if tenant_id.is_none() && policy.tenant == TenantRequirement::Required {
        return Err(AppError::BadRequest("Tenant ID is required".to_string()));
    }

    authorize(principal.role, policy.roles)?;

    Ok(RequestContext {
        request_id,
        tenant_id,
        user: Some(principal),
    })
}

fn authenticate(headers: &HeaderMap, jwt: &JwtManager) -> Result<Principal, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;
    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Authorization header must use Bearer scheme".to_string())
    })?;

    let claims = jwt
        .verify_access_token(token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
    let user_id = StringUuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    Ok(Principal {
        user_id,
        email: claims.email,
        tenant_id: claims.tenant_id,
        role: claims.role,
    })
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("request context not resolved")))
    }
}

/// The authenticated caller; rejects anonymous requests
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = RequestContext::from_request_parts(parts, state).await?;
        context
            .user
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for TenantScope {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = RequestContext::from_request_parts(parts, state).await?;
        let tenant_id = context
            .tenant_id
            .ok_or_else(|| AppError::BadRequest("Tenant ID is required".to_string()))?;
        StringUuid::parse_str(&tenant_id)
            .map(TenantScope::bind)
            .map_err(|_| AppError::BadRequest("Invalid tenant ID".to_string()))
    }
}
