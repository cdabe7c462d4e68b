//! Tenant (church) business logic

use crate::cache::CacheOperations;
use crate::crypto::{generate_join_code, slugify};
use crate::domain::{
    CreateJoinCodeInput, CreateTenantInput, JoinCode, NewJoinCode, NewTenant, Page, PageRequest,
    Role, StringUuid, Tenant, TenantBranding, TenantSettings, TenantStatus, UpdateTenantInput,
};
use crate::error::{AppError, Result};
use crate::repository::{JoinCodeRepository, TenantRepository, TenantScope};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

/// Attempts before join-code generation gives up
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// A join code resolved to the church it admits into
#[derive(Debug, Clone)]
pub struct ResolvedJoinCode {
    pub tenant: Tenant,
    pub role: Role,
    pub code: String,
}

pub struct TenantService<R: TenantRepository, J: JoinCodeRepository> {
    repo: Arc<R>,
    join_code_repo: Arc<J>,
    cache: Arc<dyn CacheOperations>,
}

impl<R: TenantRepository, J: JoinCodeRepository> TenantService<R, J> {
    pub fn new(repo: Arc<R>, join_code_repo: Arc<J>, cache: Arc<dyn CacheOperations>) -> Self {
        Self {
            repo,
            join_code_repo,
            cache,
        }
    }

    pub async fn create(&self, input: CreateTenantInput) -> Result<Tenant> {
        input.validate()?;

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "Church name must contain letters or digits".to_string(),
            ));
        }
        if self.repo.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict("Church name already exists".to_string()));
        }

        let join_code = self.generate_unique_join_code().await?;

        let tenant = self
            .repo
            .create(&NewTenant {
                name: input.name,
                slug,
                email: input.email.trim().to_lowercase(),
                phone: input.phone,
                address: input.address,
                denomination: input.denomination,
                website: input.website,
                join_code: join_code.clone(),
                status: TenantStatus::Trial,
                subscription_plan: input.subscription_plan.unwrap_or_default(),
                settings: TenantSettings::default(),
                branding: TenantBranding::default(),
            })
            .await?;

        self.join_code_repo
            .create(&NewJoinCode {
                tenant_id: tenant.id,
                code: join_code,
                role_granted: Role::Member,
                expires_at: None,
                max_uses: None,
                description: Some("Primary join code".to_string()),
                created_by: None,
            })
            .await?;

        let _ = self.cache.set_tenant(&tenant).await;
        metrics::counter!("ecclesia_tenants_created_total").increment(1);
        info!(tenant_id = %tenant.id, slug = %tenant.slug, "Church created");
        Ok(tenant)
    }

    /// Read-through: cache first, store on miss or cache error
    pub async fn get(&self, id: StringUuid) -> Result<Tenant> {
        if let Ok(Some(tenant)) = self.cache.get_tenant(id).await {
            return Ok(tenant);
        }
        let tenant = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Church not found".to_string()))?;
        let _ = self.cache.set_tenant(&tenant).await;
        Ok(tenant)
    }

    /// Read-through via the slug index. A cached tenant whose slug no longer
    /// matches (renamed since) is ignored.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Tenant> {
        if let Ok(Some(id)) = self.cache.get_tenant_id_by_slug(slug).await {
            if let Ok(Some(tenant)) = self.cache.get_tenant(id).await {
                if tenant.slug == slug {
                    return Ok(tenant);
                }
            }
        }
        let tenant = self
            .repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Church not found".to_string()))?;
        let _ = self.cache.set_tenant(&tenant).await;
        Ok(tenant)
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Tenant>> {
        let tenants = self.repo.list(page.skip(), page.limit()).await?;
        let total = self.repo.count().await?;
        Ok(Page::new(tenants, total, page))
    }

    /// Exact, case-sensitive lookup against active join-code records. The
    /// primary code has a record too, so deactivating it stops it resolving.
    /// Expiry and usage caps are stored but not checked here.
    pub async fn resolve_join_code(&self, code: &str) -> Result<ResolvedJoinCode> {
        let resolved = match self.join_code_repo.find_active_by_code(code).await? {
            Some(join_code) => self
                .repo
                .find_by_id(join_code.tenant_id)
                .await?
                .map(|tenant| (tenant, join_code.role_granted)),
            None => None,
        };

        let (tenant, role) =
            resolved.ok_or_else(|| AppError::NotFound("Invalid join code".to_string()))?;

        if !tenant.status.accepts_members() {
            return Err(AppError::BadRequest(
                "This church is not accepting new members".to_string(),
            ));
        }

        Ok(ResolvedJoinCode {
            tenant,
            role,
            code: code.to_string(),
        })
    }

    /// Status and subscription plan are platform controls; only a
    /// super_admin `actor` may change them.
    pub async fn update(
        &self,
        id: StringUuid,
        input: UpdateTenantInput,
        actor: Role,
    ) -> Result<Tenant> {
        input.validate()?;

        if (input.status.is_some() || input.subscription_plan.is_some())
            && actor != Role::SuperAdmin
        {
            return Err(AppError::Forbidden(
                "Only platform administrators can change church status or plan".to_string(),
            ));
        }

        let mut tenant = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Church not found".to_string()))?;

        if let Some(name) = input.name {
            if name != tenant.name {
                let slug = slugify(&name);
                if slug.is_empty() {
                    return Err(AppError::BadRequest(
                        "Church name must contain letters or digits".to_string(),
                    ));
                }
                if let Some(existing) = self.repo.find_by_slug(&slug).await? {
                    if existing.id != id {
                        return Err(AppError::Conflict(
                            "Church name already exists".to_string(),
                        ));
                    }
                }
                tenant.name = name;
                tenant.slug = slug;
            }
        }
        if let Some(email) = input.email {
            tenant.email = email.trim().to_lowercase();
        }
        if input.phone.is_some() {
            tenant.phone = input.phone;
        }
        if input.address.is_some() {
            tenant.address = input.address;
        }
        if input.denomination.is_some() {
            tenant.denomination = input.denomination;
        }
        if input.website.is_some() {
            tenant.website = input.website;
        }
        if let Some(status) = input.status {
            tenant.status = status;
        }
        if let Some(plan) = input.subscription_plan {
            tenant.subscription_plan = plan;
        }
        if let Some(patch) = input.settings {
            tenant.settings.apply(patch);
        }
        if let Some(patch) = input.branding {
            tenant.branding.apply(patch);
        }

        let updated = self.repo.update(&tenant).await?;
        let _ = self.cache.invalidate_tenant(id).await;
        Ok(updated)
    }

    /// Replace the primary join code. The old code stops resolving.
    pub async fn regenerate_join_code(&self, id: StringUuid) -> Result<Tenant> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Church not found".to_string()))?;

        let code = self.generate_unique_join_code().await?;
        let updated = self.repo.update_join_code(id, &code).await?;

        let scope = TenantScope::bind(id);
        self.join_code_repo
            .deactivate_code(&scope, &current.join_code)
            .await?;
        self.join_code_repo
            .create(&NewJoinCode {
                tenant_id: id,
                code,
                role_granted: Role::Member,
                expires_at: None,
                max_uses: None,
                description: Some("Primary join code".to_string()),
                created_by: None,
            })
            .await?;

        let _ = self.cache.invalidate_tenant(id).await;
        info!(tenant_id = %id, "Join code regenerated");
        Ok(updated)
    }

    /// Additional join code, e.g. one that grants `leader`
    pub async fn create_join_code(
        &self,
        scope: &TenantScope,
        input: CreateJoinCodeInput,
        created_by: StringUuid,
    ) -> Result<JoinCode> {
        input.validate()?;

        let role_granted = input.role_granted.unwrap_or(Role::Member);
        if !role_granted.is_tenant_role() {
            return Err(AppError::BadRequest(
                "Join codes cannot grant super_admin".to_string(),
            ));
        }

        let code = self.generate_unique_join_code().await?;
        self.join_code_repo
            .create(&NewJoinCode {
                tenant_id: scope.tenant_id(),
                code,
                role_granted,
                expires_at: input.expires_at,
                max_uses: input.max_uses,
                description: input.description,
                created_by: Some(created_by),
            })
            .await
    }

    pub async fn list_join_codes(&self, scope: &TenantScope) -> Result<Vec<JoinCode>> {
        self.join_code_repo.list(scope).await
    }

    pub async fn deactivate_join_code(&self, scope: &TenantScope, id: StringUuid) -> Result<()> {
        self.join_code_repo.deactivate(scope, id).await
    }

    /// Count one redemption of `code` against its join-code record
    pub async fn record_join_code_use(&self, scope: &TenantScope, code: &str) -> Result<()> {
        self.join_code_repo.increment_usage(scope, code).await
    }

    pub async fn increment_member_count(&self, id: StringUuid) -> Result<()> {
        self.repo.increment_member_count(id).await?;
        let _ = self.cache.invalidate_tenant(id).await;
        Ok(())
    }

    pub async fn decrement_member_count(&self, id: StringUuid) -> Result<()> {
        self.repo.decrement_member_count(id).await?;
        let _ = self.cache.invalidate_tenant(id).await;
        Ok(())
    }

    pub async fn delete(&self, id: StringUuid) -> Result<()> {
        self.repo.delete(id).await?;
        let _ = self.cache.invalidate_tenant(id).await;
        info!(tenant_id = %id, "Church deleted");
        Ok(())
    }

    /// Unique across primary codes and every join-code record
    async fn generate_unique_join_code(&self) -> Result<String> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_join_code();
            let taken = self.repo.find_by_join_code(&code).await?.is_some()
                || self.join_code_repo.code_exists(&code).await?;
            if !taken {
                return Ok(code);
            }
            debug!(attempt, "Join code collision");
        }
        Err(AppError::BadRequest(
            "Failed to generate unique join code".to_string(),
        ))
    }
}
