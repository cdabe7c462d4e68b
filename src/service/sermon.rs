//! Sermon library

use crate::domain::{
    timestamp, CreateSermonInput, Page, PageRequest, Sermon, SermonQuery, Stored, StringUuid,
    UpdateSermonInput,
};
use crate::error::{AppError, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::repository::{Filter, ScopedRepository, Sort, TenantScope, Update};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Sermon not found".to_string())
}

pub struct SermonService<S: ScopedRepository<Sermon>> {
    store: Arc<S>,
    events: Arc<dyn EventPublisher>,
}

impl<S: ScopedRepository<Sermon>> SermonService<S> {
    pub fn new(store: Arc<S>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, events }
    }

    pub async fn create(
        &self,
        scope: &TenantScope,
        input: CreateSermonInput,
        created_by: StringUuid,
    ) -> Result<Stored<Sermon>> {
        input.validate()?;
        let sermon = self
            .store
            .create(scope, input.into_sermon(created_by))
            .await?;
        info!(tenant_id = %scope, sermon_id = %sermon.id, "Sermon created");
        Ok(sermon)
    }

    /// Counts a view on every read. A view is not an edit, so `updatedAt`
    /// stays put.
    pub async fn get(&self, scope: &TenantScope, id: StringUuid) -> Result<Stored<Sermon>> {
        self.store
            .update(scope, id, Update::new().inc("viewCount", 1).untouched())
            .await?
            .ok_or_else(not_found)
    }

    pub async fn list(&self, scope: &TenantScope, query: SermonQuery) -> Result<Page<Stored<Sermon>>> {
        let mut filter = Filter::new();
        if let Some(speaker) = query.speaker {
            filter = filter.eq("speaker", speaker);
        }
        if let Some(tag) = query.tag {
            filter = filter.contains("tags", tag);
        }
        if let Some(is_published) = query.is_published {
            filter = filter.eq("isPublished", is_published);
        }

        self.store
            .find_page(
                scope,
                filter,
                Sort::desc("date"),
                PageRequest::new(query.page, query.limit),
            )
            .await
    }

    pub async fn update(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        input: UpdateSermonInput,
    ) -> Result<Stored<Sermon>> {
        input.validate()?;
        let update = Update::new()
            .set_opt("title", input.title)
            .set_opt("speaker", input.speaker)
            .set_opt("date", input.date.as_ref().map(timestamp::format))
            .set_opt("description", input.description)
            .set_opt("notes", input.notes)
            .set_opt("mediaUrl", input.media_url)
            .set_opt("thumbnailUrl", input.thumbnail_url)
            .set_opt("tags", input.tags)
            .set_opt("scriptureReferences", input.scripture_references)
            .set_opt("duration", input.duration);

        self.store
            .update(scope, id, update)
            .await?
            .ok_or_else(not_found)
    }

    /// Idempotent: an already-published sermon is returned as is and no
    /// event is emitted
    pub async fn publish(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
    ) -> Result<Stored<Sermon>> {
        let sermon = self.store.find_by_id(scope, id).await?.ok_or_else(not_found)?;
        if sermon.doc.is_published {
            return Ok(sermon);
        }

        let published = self
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
            .publish(DomainEvent::SermonPublished {
                tenant_id: scope.tenant_id(),
                user_id,
                timestamp: Utc::now(),
                sermon_id: published.id,
                title: published.doc.title.clone(),
                speaker: published.doc.speaker.clone(),
            })
            .await;

        info!(tenant_id = %scope, sermon_id = %id, "Sermon published");
        Ok(published)
    }

    pub async fn delete(&self, scope: &TenantScope, id: StringUuid) -> Result<()> {
        if !self.store.delete(scope, id).await? {
            return Err(not_found());
        }
        info!(tenant_id = %scope, sermon_id = %id, "Sermon deleted");
        Ok(())
    }

    /// Distinct speakers, alphabetical
    pub async fn speakers(&self, scope: &TenantScope) -> Result<Vec<String>> {
        let sermons = self.store.find(scope, Filter::new(), Sort::default()).await?;
        let speakers: BTreeSet<String> = sermons.into_iter().map(|s| s.doc.speaker).collect();
        Ok(speakers.into_iter().collect())
    }

    /// Distinct tags, alphabetical
    pub async fn tags(&self, scope: &TenantScope) -> Result<Vec<String>> {
        let sermons = self.store.find(scope, Filter::new(), Sort::default()).await?;
        let tags: BTreeSet<String> = sermons.into_iter().flat_map(|s| s.doc.tags).collect();
        Ok(tags.into_iter().collect())
    }
}
