//! User repository

use super::map_conflict_if_duplicate;
use crate::domain::{NewUser, Role, StringUuid, User};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const USER_COLUMNS: &str = "id, tenant_id, email, password_hash, first_name, last_name, phone, \
     role, status, email_verified, email_verification_code, refresh_token, last_login_at, \
     created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, input: &NewUser) -> Result<User>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<User>>;
    async fn find_by_email_in_tenant(
        &self,
        tenant_id: StringUuid,
        email: &str,
    ) -> Result<Option<User>>;
    /// Lookup across all tenants; the oldest account wins when an email is
    /// registered in several churches
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Store (or clear) the single active refresh token
    async fn set_refresh_token(&self, id: StringUuid, token: Option<String>) -> Result<()>;
    /// Store the refresh token and stamp `last_login_at`
    async fn record_login(&self, id: StringUuid, refresh_token: &str) -> Result<()>;
    async fn set_verification_code(&self, id: StringUuid, code: &str) -> Result<()>;
    /// Set `email_verified`, clear the code and activate the account
    async fn mark_email_verified(&self, id: StringUuid) -> Result<User>;
    async fn update_role(&self, id: StringUuid, role: Role) -> Result<()>;
}

pub struct UserRepositoryImpl {
    pool: MySqlPool,
}

impl UserRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, input: &NewUser) -> Result<User> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO users (id, tenant_id, email, password_hash, first_name, last_name, phone,
                               role, status, email_verified, email_verification_code,
                               created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, FALSE, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(input.tenant_id)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .bind(input.role)
        .bind(input.status)
        .bind(&input.email_verification_code)
        .execute(&self.pool)
        .await
        .map_err(|e| map_conflict_if_duplicate(e, "User already exists in this church"))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create user")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email_in_tenant(
        &self,
        tenant_id: StringUuid,
        email: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE tenant_id = ? AND email = ?",
            USER_COLUMNS
        ))
        .bind(tenant_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ? ORDER BY created_at ASC LIMIT 1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_refresh_token(&self, id: StringUuid, token: Option<String>) -> Result<()> {
        sqlx::query("UPDATE users SET refresh_token = ?, updated_at = NOW() WHERE id = ?")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_login(&self, id: StringUuid, refresh_token: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = ?, last_login_at = NOW(), updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(refresh_token)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_verification_code(&self, id: StringUuid, code: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET email_verification_code = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(code)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_email_verified(&self, id: StringUuid) -> Result<User> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_verified = TRUE, email_verification_code = NULL, status = 'active',
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn update_role(&self, id: StringUuid, role: Role) -> Result<()> {
        sqlx::query("UPDATE users SET role = ?, updated_at = NOW() WHERE id = ?")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
