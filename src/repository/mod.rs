//! Data access layer (Repository pattern)

pub mod document;
pub mod join_code;
pub mod membership;
pub mod scope;
pub mod tenant;
pub mod user;

pub use document::{Filter, ScopedRepository, ScopedStore, Sort, Update};
pub use join_code::{JoinCodeRepository, JoinCodeRepositoryImpl};
pub use membership::{MembershipRepository, MembershipRepositoryImpl};
pub use scope::TenantScope;
pub use tenant::{TenantRepository, TenantRepositoryImpl};
pub use user::{UserRepository, UserRepositoryImpl};

use crate::error::AppError;

/// Map a MySQL duplicate-key violation (error 1062) to a conflict
pub(crate) fn map_conflict_if_duplicate(error: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &error {
        if db_err.code().as_deref() == Some("1062") {
            return AppError::Conflict(message.to_string());
        }
    }
    AppError::Database(error)
}
