//! Church calendar and attendance

use crate::domain::{
    timestamp, ChurchEvent, CreateEventInput, Page, PageRequest, Stored, StringUuid,
};
use crate::error::{AppError, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::repository::{Filter, ScopedRepository, Sort, TenantScope, Update};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Event not found".to_string())
}

pub struct ChurchEventService<S: ScopedRepository<ChurchEvent>> {
    store: Arc<S>,
    events: Arc<dyn EventPublisher>,
}

impl<S: ScopedRepository<ChurchEvent>> ChurchEventService<S> {
    pub fn new(store: Arc<S>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, events }
    }

    pub async fn create(
        &self,
        scope: &TenantScope,
        input: CreateEventInput,
        created_by: StringUuid,
    ) -> Result<Stored<ChurchEvent>> {
        input.validate()?;
        let event = self.store.create(scope, input.into_event(created_by)).await?;

        self.events
            .publish(DomainEvent::EventCreated {
                tenant_id: scope.tenant_id(),
                user_id: created_by,
                timestamp: Utc::now(),
                event_id: event.id,
                title: event.doc.title.clone(),
                start_date: event.doc.start_date,
            })
            .await;

        info!(tenant_id = %scope, event_id = %event.id, "Event created");
        Ok(event)
    }

    /// Upcoming events only, soonest first
    pub async fn list_upcoming(
        &self,
        scope: &TenantScope,
        page: PageRequest,
    ) -> Result<Page<Stored<ChurchEvent>>> {
        self.store
            .find_page(
                scope,
                Filter::new().gte("startDate", timestamp::format(&Utc::now())),
                Sort::asc("startDate"),
                page,
            )
            .await
    }

    pub async fn get(&self, scope: &TenantScope, id: StringUuid) -> Result<Stored<ChurchEvent>> {
        self.store.find_by_id(scope, id).await?.ok_or_else(not_found)
    }

    pub async fn register(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
    ) -> Result<Stored<ChurchEvent>> {
        let event = self.get(scope, id).await?;

        if !event.doc.requires_registration {
            return Err(AppError::BadRequest(
                "This event does not require registration".to_string(),
            ));
        }
        if event.doc.attendees.contains(&user_id) {
            return Err(AppError::BadRequest(
                "Already registered for this event".to_string(),
            ));
        }
        if event.doc.is_full() {
            return Err(AppError::BadRequest("Event is full".to_string()));
        }

        let mut attendees = event.doc.attendees;
        attendees.push(user_id);
        self.store
            .update(scope, id, Update::new().set("attendees", attendees))
            .await?
            .ok_or_else(not_found)
    }

    /// Removing an absent attendee is a no-op
    pub async fn unregister(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
    ) -> Result<Stored<ChurchEvent>> {
        let event = self.get(scope, id).await?;
        if !event.doc.attendees.contains(&user_id) {
            return Ok(event);
        }

        let attendees: Vec<StringUuid> = event
            .doc
            .attendees
            .into_iter()
            .filter(|a| *a != user_id)
            .collect();
        self.store
            .update(scope, id, Update::new().set("attendees", attendees))
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, scope: &TenantScope, id: StringUuid) -> Result<()> {
        if !self.store.delete(scope, id).await? {
            return Err(not_found());
        }
        info!(tenant_id = %scope, event_id = %id, "Event deleted");
        Ok(())
    }
}
