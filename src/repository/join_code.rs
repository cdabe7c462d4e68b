//! Join code repository

use super::{map_conflict_if_duplicate, TenantScope};
use crate::domain::{JoinCode, NewJoinCode, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const JOIN_CODE_COLUMNS: &str = "id, tenant_id, code, role_granted, expires_at, max_uses, \
     usage_count, is_active, description, created_by, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JoinCodeRepository: Send + Sync {
    async fn create(&self, input: &NewJoinCode) -> Result<JoinCode>;
    /// Case-sensitive match restricted to active codes
    async fn find_active_by_code(&self, code: &str) -> Result<Option<JoinCode>>;
    /// True if any code row, active or not, already uses `code`
    async fn code_exists(&self, code: &str) -> Result<bool>;
    async fn list(&self, scope: &TenantScope) -> Result<Vec<JoinCode>>;
    async fn deactivate(&self, scope: &TenantScope, id: StringUuid) -> Result<()>;
    async fn deactivate_code(&self, scope: &TenantScope, code: &str) -> Result<()>;
    async fn increment_usage(&self, scope: &TenantScope, code: &str) -> Result<()>;
}

pub struct JoinCodeRepositoryImpl {
    pool: MySqlPool,
}

impl JoinCodeRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<JoinCode>> {
        let code = sqlx::query_as::<_, JoinCode>(&format!(
            "SELECT {} FROM join_codes WHERE id = ?",
            JOIN_CODE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(code)
    }
}

#[async_trait]
impl JoinCodeRepository for JoinCodeRepositoryImpl {
    async fn create(&self, input: &NewJoinCode) -> Result<JoinCode> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO join_codes (id, tenant_id, code, role_granted, expires_at, max_uses,
                                    usage_count, is_active, description, created_by,
                                    created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, TRUE, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(input.tenant_id)
        .bind(&input.code)
        .bind(input.role_granted)
        .bind(input.expires_at)
        .bind(input.max_uses)
        .bind(&input.description)
        .bind(input.created_by)
        .execute(&self.pool)
        .await
        .map_err(|e| map_conflict_if_duplicate(e, "Join code already exists"))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create join code")))
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<JoinCode>> {
        let join_code = sqlx::query_as::<_, JoinCode>(&format!(
            "SELECT {} FROM join_codes WHERE code = ? AND is_active = TRUE",
            JOIN_CODE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(join_code)
    }

    async fn code_exists(&self, code: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM join_codes WHERE code = ?")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 > 0)
    }

    async fn list(&self, scope: &TenantScope) -> Result<Vec<JoinCode>> {
        let codes = sqlx::query_as::<_, JoinCode>(&format!(
            "SELECT {} FROM join_codes WHERE tenant_id = ? ORDER BY created_at DESC",
            JOIN_CODE_COLUMNS
        ))
        .bind(scope.tenant_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    async fn deactivate(&self, scope: &TenantScope, id: StringUuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE join_codes SET is_active = FALSE, updated_at = NOW() WHERE tenant_id = ? AND id = ?",
        )
        .bind(scope.tenant_id())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Join code not found".to_string()));
        }
        Ok(())
    }

    async fn deactivate_code(&self, scope: &TenantScope, code: &str) -> Result<()> {
        sqlx::query(
            "UPDATE join_codes SET is_active = FALSE, updated_at = NOW() WHERE tenant_id = ? AND code = ?",
        )
        .bind(scope.tenant_id())
        .bind(code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn increment_usage(&self, scope: &TenantScope, code: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE join_codes
            SET usage_count = usage_count + 1, updated_at = NOW()
            WHERE tenant_id = ? AND code = ?
            "#,
        )
        .bind(scope.tenant_id())
        .bind(code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
