//! HTTP middleware: request ids and metrics, log span sanitizing, the error
//! boundary and per-route context resolution

pub mod context;
pub mod error_response;
pub mod metrics;
pub mod trace;

pub use context::{
    resolve_context, ContextGuard, CurrentUser, Principal, RequestContext, TENANT_HEADER,
};
pub use error_response::normalize_error_response;
pub use metrics::{ObservabilityLayer, RequestId};
pub use trace::SanitizedMakeSpan;
