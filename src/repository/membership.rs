//! Membership repository

use super::{map_conflict_if_duplicate, TenantScope};
use crate::domain::{Membership, NewMembership, StringUuid, UpdateMembershipInput};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const MEMBERSHIP_COLUMNS: &str =
    "id, tenant_id, user_id, role, status, joined_at, join_code_used, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Conflict if the user already belongs to the tenant
    async fn create(&self, scope: &TenantScope, input: &NewMembership) -> Result<Membership>;
    async fn find_by_user(
        &self,
        scope: &TenantScope,
        user_id: StringUuid,
    ) -> Result<Option<Membership>>;
    async fn list(&self, scope: &TenantScope, offset: i64, limit: i64)
        -> Result<Vec<Membership>>;
    async fn count(&self, scope: &TenantScope) -> Result<i64>;
    async fn update(
        &self,
        scope: &TenantScope,
        user_id: StringUuid,
        input: &UpdateMembershipInput,
    ) -> Result<Membership>;
}

pub struct MembershipRepositoryImpl {
    pool: MySqlPool,
}

impl MembershipRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for MembershipRepositoryImpl {
    async fn create(&self, scope: &TenantScope, input: &NewMembership) -> Result<Membership> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO memberships (id, tenant_id, user_id, role, status, joined_at,
                                     join_code_used, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, NOW(), ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(scope.tenant_id())
        .bind(input.user_id)
        .bind(input.role)
        .bind(input.status)
        .bind(&input.join_code_used)
        .execute(&self.pool)
        .await
        .map_err(|e| map_conflict_if_duplicate(e, "User is already a member of this church"))?;

        self.find_by_user(scope, input.user_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create membership")))
    }

    async fn find_by_user(
        &self,
        scope: &TenantScope,
        user_id: StringUuid,
    ) -> Result<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM memberships WHERE tenant_id = ? AND user_id = ?",
            MEMBERSHIP_COLUMNS
        ))
        .bind(scope.tenant_id())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(membership)
    }

    async fn list(
        &self,
        scope: &TenantScope,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Membership>> {
        let memberships = sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM memberships WHERE tenant_id = ? ORDER BY joined_at DESC LIMIT ? OFFSET ?",
            MEMBERSHIP_COLUMNS
        ))
        .bind(scope.tenant_id())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(memberships)
    }

    async fn count(&self, scope: &TenantScope) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memberships WHERE tenant_id = ?")
            .bind(scope.tenant_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        user_id: StringUuid,
        input: &UpdateMembershipInput,
    ) -> Result<Membership> {
        let existing = self
            .find_by_user(scope, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

        let role = input.role.unwrap_or(existing.role);
        let status = input.status.unwrap_or(existing.status);

        sqlx::query(
            r#"
            UPDATE memberships
            SET role = ?, status = ?, updated_at = NOW()
            WHERE tenant_id = ? AND user_id = ?
            "#,
        )
        .bind(role)
        .bind(status)
        .bind(scope.tenant_id())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.find_by_user(scope, user_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update membership")))
    }
}
