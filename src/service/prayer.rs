//! Prayer wall

use crate::domain::{
    CreatePrayerInput, Page, PageRequest, PrayerRequest, PrayerStatus, Stored, StringUuid,
};
use crate::error::{AppError, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::repository::{Filter, ScopedRepository, Sort, TenantScope, Update};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Prayer request not found".to_string())
}

pub struct PrayerService<S: ScopedRepository<PrayerRequest>> {
    store: Arc<S>,
    events: Arc<dyn EventPublisher>,
}

impl<S: ScopedRepository<PrayerRequest>> PrayerService<S> {
    pub fn new(store: Arc<S>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, events }
    }

    pub async fn create(
        &self,
        scope: &TenantScope,
        input: CreatePrayerInput,
        user_id: StringUuid,
    ) -> Result<Stored<PrayerRequest>> {
        input.validate()?;
        let prayer = self.store.create(scope, input.into_request(user_id)).await?;

        self.events
            .publish(DomainEvent::PrayerRequestCreated {
                tenant_id: scope.tenant_id(),
                user_id,
                timestamp: Utc::now(),
                prayer_id: prayer.id,
                title: prayer.doc.title.clone(),
                visibility: prayer.doc.visibility,
                group_ids: prayer.doc.group_ids.clone(),
            })
            .await;

        info!(tenant_id = %scope, prayer_id = %prayer.id, "Prayer request created");
        Ok(prayer)
    }

    /// The shared wall: private requests are never listed
    pub async fn list(
        &self,
        scope: &TenantScope,
        page: PageRequest,
    ) -> Result<Page<Stored<PrayerRequest>>> {
        self.store
            .find_page(
                scope,
                Filter::new().eq("isPrivate", false),
                Sort::default(),
                page,
            )
            .await
    }

    pub async fn mine(
        &self,
        scope: &TenantScope,
        user_id: StringUuid,
    ) -> Result<Vec<Stored<PrayerRequest>>> {
        self.store
            .find(scope, Filter::new().eq("userId", user_id), Sort::default())
            .await
    }

    pub async fn get(&self, scope: &TenantScope, id: StringUuid) -> Result<Stored<PrayerRequest>> {
        self.store.find_by_id(scope, id).await?.ok_or_else(not_found)
    }

    pub async fn pray(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
    ) -> Result<Stored<PrayerRequest>> {
        let prayer = self.get(scope, id).await?;
        if prayer.doc.prayed_by.contains(&user_id) {
            return Err(AppError::BadRequest(
                "Already prayed for this request".to_string(),
            ));
        }

        let mut prayed_by = prayer.doc.prayed_by;
        prayed_by.push(user_id);
        let count = prayed_by.len() as i64;

        self.store
            .update(
                scope,
                id,
                Update::new()
                    .set("prayedBy", prayed_by)
                    .set("prayerCount", count),
            )
            .await?
            .ok_or_else(not_found)
    }

    pub async fn mark_answered(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
    ) -> Result<Stored<PrayerRequest>> {
        let prayer = self.get(scope, id).await?;
        if prayer.doc.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the creator can mark prayer as answered".to_string(),
            ));
        }
        if prayer.doc.status == PrayerStatus::Answered {
            return Ok(prayer);
        }

        self.store
            .update(scope, id, Update::new().set("status", PrayerStatus::Answered))
            .await?
            .ok_or_else(not_found)
    }
}
