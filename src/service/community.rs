//! Community feed

use crate::domain::{CreatePostInput, Page, PageRequest, Permission, Post, Role, Stored, StringUuid};
use crate::error::{AppError, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::policy::has_permission;
use crate::repository::{Filter, ScopedRepository, Sort, TenantScope, Update, UserRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

pub struct CommunityService<S: ScopedRepository<Post>, U: UserRepository> {
    store: Arc<S>,
    user_repo: Arc<U>,
    events: Arc<dyn EventPublisher>,
}

impl<S: ScopedRepository<Post>, U: UserRepository> CommunityService<S, U> {
    pub fn new(store: Arc<S>, user_repo: Arc<U>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            store,
            user_repo,
            events,
        }
    }

    pub async fn create(
        &self,
        scope: &TenantScope,
        input: CreatePostInput,
        author_id: StringUuid,
    ) -> Result<Stored<Post>> {
        input.validate()?;
        let author = self
            .user_repo
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let post = Post {
            author_id,
            author_name: author.full_name(),
            content: input.content,
            images: input.images,
            likes: Vec::new(),
            comments_count: 0,
            is_pinned: false,
        };
        let post = self.store.create(scope, post).await?;

        self.events
            .publish(DomainEvent::CommunityPostCreated {
                tenant_id: scope.tenant_id(),
                user_id: author_id,
                timestamp: Utc::now(),
                post_id: post.id,
                content: post.doc.content.clone(),
                author_name: post.doc.author_name.clone(),
            })
            .await;

        info!(tenant_id = %scope, post_id = %post.id, "Post created");
        Ok(post)
    }

    pub async fn list(&self, scope: &TenantScope, page: PageRequest) -> Result<Page<Stored<Post>>> {
        self.store
            .find_page(scope, Filter::new(), Sort::default(), page)
            .await
    }

    pub async fn toggle_like(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
    ) -> Result<Stored<Post>> {
        let mut post = self.store.find_by_id(scope, id).await?.ok_or_else(not_found)?;
        post.doc.toggle_like(user_id);

        self.store
            .update(scope, id, Update::new().set("likes", &post.doc.likes))
            .await?
            .ok_or_else(not_found)
    }

    /// Authors may delete their own posts; moderators any post
    pub async fn delete(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        user_id: StringUuid,
        role: Role,
    ) -> Result<()> {
        let post = self.store.find_by_id(scope, id).await?.ok_or_else(not_found)?;
        if post.doc.author_id != user_id && !has_permission(role, Permission::DeleteAnyPost) {
            return Err(AppError::Forbidden(
                "Only the author can delete this post".to_string(),
            ));
        }

        self.store.delete(scope, id).await?;
        info!(tenant_id = %scope, post_id = %id, deleted_by = %user_id, "Post deleted");
        Ok(())
    }
}
