//! Church membership management

use crate::domain::{Membership, Page, PageRequest, StringUuid, UpdateMembershipInput};
use crate::error::{AppError, Result};
use crate::repository::{MembershipRepository, TenantScope, UserRepository};
use std::sync::Arc;
use tracing::info;

pub struct MembershipService<M: MembershipRepository, U: UserRepository> {
    repo: Arc<M>,
    user_repo: Arc<U>,
}

impl<M: MembershipRepository, U: UserRepository> MembershipService<M, U> {
    pub fn new(repo: Arc<M>, user_repo: Arc<U>) -> Self {
        Self { repo, user_repo }
    }

    pub async fn list(&self, scope: &TenantScope, page: PageRequest) -> Result<Page<Membership>> {
        let memberships = self.repo.list(scope, page.skip(), page.limit()).await?;
        let total = self.repo.count(scope).await?;
        Ok(Page::new(memberships, total, page))
    }

    pub async fn get(&self, scope: &TenantScope, user_id: StringUuid) -> Result<Membership> {
        self.repo
            .find_by_user(scope, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))
    }

    /// Role changes are mirrored onto the user so newly issued tokens carry them
    pub async fn update(
        &self,
        scope: &TenantScope,
        user_id: StringUuid,
        input: UpdateMembershipInput,
    ) -> Result<Membership> {
        if let Some(role) = input.role {
            if !role.is_tenant_role() {
                return Err(AppError::BadRequest(
                    "Members cannot be promoted to super_admin".to_string(),
                ));
            }
        }

        let previous = self.get(scope, user_id).await?;
        let membership = self.repo.update(scope, user_id, &input).await?;

        if membership.role != previous.role {
            self.user_repo.update_role(user_id, membership.role).await?;
            info!(
                tenant_id = %scope,
                user_id = %user_id,
                from = %previous.role,
                to = %membership.role,
                "Member role changed"
            );
        }
        Ok(membership)
    }
}
