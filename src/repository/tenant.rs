//! Tenant repository

use super::map_conflict_if_duplicate;
use crate::domain::{NewTenant, StringUuid, Tenant};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const TENANT_COLUMNS: &str = "id, name, slug, email, phone, address, denomination, website, \
     join_code, status, subscription_plan, member_count, settings, branding, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, input: &NewTenant) -> Result<Tenant>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Tenant>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>>;
    /// Case-sensitive match on the primary join code
    async fn find_by_join_code(&self, code: &str) -> Result<Option<Tenant>>;
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Tenant>>;
    async fn count(&self) -> Result<i64>;
    /// Persist every mutable column of an already-merged tenant
    async fn update(&self, tenant: &Tenant) -> Result<Tenant>;
    async fn update_join_code(&self, id: StringUuid, join_code: &str) -> Result<Tenant>;
    async fn increment_member_count(&self, id: StringUuid) -> Result<()>;
    /// Never drops below zero
    async fn decrement_member_count(&self, id: StringUuid) -> Result<()>;
    async fn delete(&self, id: StringUuid) -> Result<()>;
}

pub struct TenantRepositoryImpl {
    pool: MySqlPool,
}

impl TenantRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for TenantRepositoryImpl {
    async fn create(&self, input: &NewTenant) -> Result<Tenant> {
        let id = StringUuid::new_v4();
        let settings_json =
            serde_json::to_string(&input.settings).map_err(|e| AppError::Internal(e.into()))?;
        let branding_json =
            serde_json::to_string(&input.branding).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, slug, email, phone, address, denomination, website,
                                 join_code, status, subscription_plan, member_count, settings,
                                 branding, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.denomination)
        .bind(&input.website)
        .bind(&input.join_code)
        .bind(input.status)
        .bind(input.subscription_plan)
        .bind(&settings_json)
        .bind(&branding_json)
        .execute(&self.pool)
        .await
        .map_err(|e| map_conflict_if_duplicate(e, "Church name already exists"))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create tenant")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE id = ?",
            TENANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE slug = ?",
            TENANT_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn find_by_join_code(&self, code: &str) -> Result<Option<Tenant>> {
        // join_code uses a binary collation, so this comparison is case-sensitive
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE join_code = ?",
            TENANT_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Tenant>> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants ORDER BY created_at DESC LIMIT ? OFFSET ?",
            TENANT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant> {
        let settings_json =
            serde_json::to_string(&tenant.settings).map_err(|e| AppError::Internal(e.into()))?;
        let branding_json =
            serde_json::to_string(&tenant.branding).map_err(|e| AppError::Internal(e.into()))?;

        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET name = ?, slug = ?, email = ?, phone = ?, address = ?, denomination = ?,
                website = ?, status = ?, subscription_plan = ?, settings = ?, branding = ?,
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(&tenant.email)
        .bind(&tenant.phone)
        .bind(&tenant.address)
        .bind(&tenant.denomination)
        .bind(&tenant.website)
        .bind(tenant.status)
        .bind(tenant.subscription_plan)
        .bind(&settings_json)
        .bind(&branding_json)
        .bind(tenant.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_conflict_if_duplicate(e, "Church name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Church not found".to_string()));
        }

        self.find_by_id(tenant.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update tenant")))
    }

    async fn update_join_code(&self, id: StringUuid, join_code: &str) -> Result<Tenant> {
        let result =
            sqlx::query("UPDATE tenants SET join_code = ?, updated_at = NOW() WHERE id = ?")
                .bind(join_code)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Church not found".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update join code")))
    }

    async fn increment_member_count(&self, id: StringUuid) -> Result<()> {
        sqlx::query(
            "UPDATE tenants SET member_count = member_count + 1, updated_at = NOW() WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn decrement_member_count(&self, id: StringUuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tenants
            SET member_count = GREATEST(member_count - 1, 0), updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: StringUuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Church not found".to_string()));
        }

        Ok(())
    }
}
