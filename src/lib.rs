//! Ecclesia Core - multi-tenant church management backend
//!
//! Tenant registry, identity, per-request context resolution, role-set
//! authorization and tenant-scoped document storage, plus the feature APIs
//! (sermons, events, prayer, giving, community, worship) built on them.

pub mod api;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod domain;
pub mod email;
pub mod error;
pub mod events;
pub mod jwt;
pub mod middleware;
pub mod migration;
pub mod policy;
pub mod queue;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
