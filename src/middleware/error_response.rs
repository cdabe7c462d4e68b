//! Error boundary
//!
//! Every 4xx/5xx response leaves the service in the error envelope with the
//! request path filled in. Framework rejections (plain text from axum's
//! extractors, 404/405 from the router) are converted here, and each error is
//! logged once with the request and tenant ids.

use super::context::{TenantTag, TENANT_HEADER};
use super::metrics::RequestId;
use crate::error::{ErrorDetail, ErrorEnvelope, INTERNAL_ERROR_MESSAGE};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

const MAX_ERROR_BODY: usize = 64 * 1024;

/// Endpoints that answer with their own plain bodies
const PASSTHROUGH_PATHS: &[&str] = &["/health", "/ready", "/metrics"];

pub async fn normalize_error_response(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let header_tenant = request
        .headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let response = next.run(request).await;
    let status = response.status();

    if PASSTHROUGH_PATHS.contains(&path.as_str()) {
        return response;
    }
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let tenant_id = response
        .extensions()
        .get::<TenantTag>()
        .map(|t| t.0.clone())
        .or(header_tenant)
        .unwrap_or_default();
    let detail = response.extensions().get::<ErrorDetail>().cloned();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let (parts, body) = response.into_parts();
    let envelope = if is_json {
        match axum::body::to_bytes(body, MAX_ERROR_BODY).await {
            Ok(bytes) => serde_json::from_slice::<ErrorEnvelope>(&bytes).ok(),
            Err(_) => None,
        }
    } else {
        None
    };

    let mut envelope =
        envelope.unwrap_or_else(|| ErrorEnvelope::new(status, generic_message(status), ""));
    if envelope.error.path.is_empty() {
        envelope.error.path = path.clone();
    }
    if status.is_server_error() {
        envelope.error.message = INTERNAL_ERROR_MESSAGE.to_string();
    }

    let cause = detail
        .map(|d| d.0)
        .unwrap_or_else(|| envelope.error.message.clone());
    if status.is_server_error() {
        error!(
            request_id = %request_id,
            tenant_id = %tenant_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            error = %cause,
            "Request failed"
        );
    } else {
        warn!(
            request_id = %request_id,
            tenant_id = %tenant_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            error = %cause,
            "Request rejected"
        );
    }

    let mut normalized = (status, Json(envelope)).into_response();
    for name in [header::WWW_AUTHENTICATE, header::ALLOW] {
        if let Some(value) = parts.headers.get(&name) {
            normalized.headers_mut().insert(name, value.clone());
        }
    }
    normalized
}

fn generic_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Invalid request body",
        StatusCode::UNAUTHORIZED => "Authentication required",
        StatusCode::FORBIDDEN => "Access denied",
        StatusCode::NOT_FOUND => "Not found",
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed",
        StatusCode::CONFLICT => "Resource conflict",
        StatusCode::PAYLOAD_TOO_LARGE => "Payload too large",
        StatusCode::UNPROCESSABLE_ENTITY => "Invalid request body",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported content type",
        _ if status.is_client_error() => "Client error",
        _ => INTERNAL_ERROR_MESSAGE,
    }
}
