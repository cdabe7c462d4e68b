//! Worship set planning

use crate::domain::{
    timestamp, CreateWorshipSetInput, Page, PageRequest, Stored, StringUuid, UpdateWorshipSetInput,
    WorshipSet,
};
use crate::error::{AppError, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::repository::{Filter, ScopedRepository, Sort, TenantScope, Update};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Worship set not found".to_string())
}

pub struct WorshipService<S: ScopedRepository<WorshipSet>> {
    store: Arc<S>,
    events: Arc<dyn EventPublisher>,
}

impl<S: ScopedRepository<WorshipSet>> WorshipService<S> {
    pub fn new(store: Arc<S>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, events }
    }

    pub async fn create(
        &self,
        scope: &TenantScope,
        input: CreateWorshipSetInput,
        created_by: StringUuid,
    ) -> Result<Stored<WorshipSet>> {
        input.validate()?;
        let set = self.store.create(scope, input.into_set(created_by)).await?;
        info!(tenant_id = %scope, worship_id = %set.id, "Worship set created");
        Ok(set)
    }

    pub async fn get(&self, scope: &TenantScope, id: StringUuid) -> Result<Stored<WorshipSet>> {
        self.store.find_by_id(scope, id).await?.ok_or_else(not_found)
    }

    pub async fn list(
        &self,
        scope: &TenantScope,
        page: PageRequest,
    ) -> Result<Page<Stored<WorshipSet>>> {
        self.store
            .find_page(scope, Filter::new(), Sort::desc("scheduledAt"), page)
            .await
    }

    pub async fn update(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        input: UpdateWorshipSetInput,
    ) -> Result<Stored<WorshipSet>> {
        input.validate()?;
        let update = Update::new()
            .set_opt("title", input.title)
            .set_opt("description", input.description)
            .set_opt("scheduledAt", input.scheduled_at.as_ref().map(timestamp::format))
            .set_opt("items", input.items)
            .set_opt("leaderId", input.leader_id)
            .set_opt("teamMembers", input.team_members)
            .set_opt("notes", input.notes);

        let set = self
            .store
            .update(scope, id, update)
            .await?
            .ok_or_else(not_found)?;
        info!(tenant_id = %scope, worship_id = %id, "Worship set updated");
        Ok(set)
    }

    /// Publishing an already published set returns it unchanged
    pub async fn publish(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
    ) -> Result<Stored<WorshipSet>> {
        let existing = self.get(scope, id).await?;
        if existing.doc.is_published {
            return Ok(existing);
        }

        let set = self
            .store
            .update(
                scope,
                id,
                Update::new()
                    .set("isPublished", true)
                    .set("publishedAt", timestamp::format(&Utc::now())),
            )
            .await?
            .ok_or_else(not_found)?;

        self.events
            .publish(DomainEvent::WorshipSetScheduled {
                tenant_id: scope.tenant_id(),
                user_id,
                timestamp: Utc::now(),
                worship_id: set.id,
                title: set.doc.title.clone(),
                scheduled_for: set.doc.scheduled_at,
            })
            .await;

        info!(tenant_id = %scope, worship_id = %id, "Worship set published");
        Ok(set)
    }

    pub async fn delete(&self, scope: &TenantScope, id: StringUuid) -> Result<()> {
        if !self.store.delete(scope, id).await? {
            return Err(not_found());
        }
        info!(tenant_id = %scope, worship_id = %id, "Worship set deleted");
        Ok(())
    }
}
