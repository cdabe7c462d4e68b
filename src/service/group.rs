//! Small groups: membership is changed with single-statement array ops

use crate::domain::{
    CreateGroupInput, Group, Page, PageRequest, Permission, Role, Stored, StringUuid,
    UpdateGroupInput,
};
use crate::error::{AppError, Result};
use crate::policy::has_permission;
use crate::repository::{Filter, ScopedRepository, Sort, TenantScope, Update};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Group not found".to_string())
}

pub struct GroupService<S: ScopedRepository<Group>> {
    store: Arc<S>,
}

impl<S: ScopedRepository<Group>> GroupService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        scope: &TenantScope,
        input: CreateGroupInput,
        created_by: StringUuid,
    ) -> Result<Stored<Group>> {
        input.validate()?;
        let group = self
            .store
            .create(scope, input.into_group(created_by))
            .await?;
        info!(tenant_id = %scope, group_id = %group.id, "Group created");
        Ok(group)
    }

    pub async fn list(&self, scope: &TenantScope, page: PageRequest) -> Result<Page<Stored<Group>>> {
        self.store
            .find_page(scope, Filter::new(), Sort::default(), page)
            .await
    }

    pub async fn mine(&self, scope: &TenantScope, user_id: StringUuid) -> Result<Vec<Stored<Group>>> {
        self.store
            .find(scope, Filter::new().contains("members", user_id), Sort::default())
            .await
    }

    pub async fn get(&self, scope: &TenantScope, id: StringUuid) -> Result<Stored<Group>> {
        self.store.find_by_id(scope, id).await?.ok_or_else(not_found)
    }

    /// Group leader or a holder of `manage:groups`
    pub async fn update(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        input: UpdateGroupInput,
        user_id: StringUuid,
        role: Role,
    ) -> Result<Stored<Group>> {
        input.validate()?;
        let group = self.get(scope, id).await?;
        ensure_can_manage(&group, user_id, role)?;

        let update = Update::new()
            .set_opt("name", input.name)
            .set_opt("description", input.description)
            .set_opt("category", input.category)
            .set_opt("image", input.image)
            .set_opt("meetingSchedule", input.meeting_schedule)
            .set_opt("meetingLocation", input.meeting_location)
            .set_opt("maxMembers", input.max_members)
            .set_opt("isOpen", input.is_open);

        self.store
            .update(scope, id, update)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn join(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
    ) -> Result<Stored<Group>> {
        let group = self.get(scope, id).await?;

        if group.doc.has_member(user_id) {
            return Err(AppError::BadRequest(
                "Already a member of this group".to_string(),
            ));
        }
        if !group.doc.is_open {
            return Err(AppError::BadRequest(
                "This group is not open for new members".to_string(),
            ));
        }
        if group.doc.is_full() {
            return Err(AppError::BadRequest("Group is full".to_string()));
        }

        let group = self
            .store
            .update(scope, id, Update::new().add_to_set("members", user_id))
            .await?
            .ok_or_else(not_found)?;
        info!(tenant_id = %scope, group_id = %id, user_id = %user_id, "Joined group");
        Ok(group)
    }

    /// Leaving a group one is not in is a no-op. The leader cannot leave.
    pub async fn leave(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
    ) -> Result<Stored<Group>> {
        let group = self.get(scope, id).await?;

        if group.doc.leader_id == user_id {
            return Err(AppError::BadRequest(
                "Group leader cannot leave the group".to_string(),
            ));
        }
        if !group.doc.has_member(user_id) {
            return Ok(group);
        }

        self.store
            .update(scope, id, Update::new().pull("members", user_id))
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
        role: Role,
    ) -> Result<()> {
        let group = self.get(scope, id).await?;
        ensure_can_manage(&group, user_id, role)?;

        self.store.delete(scope, id).await?;
        info!(tenant_id = %scope, group_id = %id, deleted_by = %user_id, "Group deleted");
        Ok(())
    }
}

fn ensure_can_manage(group: &Stored<Group>, user_id: StringUuid, role: Role) -> Result<()> {
    if group.doc.leader_id == user_id || has_permission(role, Permission::ManageGroups) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Only the group leader can change this group".to_string(),
    ))
}
