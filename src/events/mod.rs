//! Domain events and the notification fan-out publisher
//!
//! Feature services publish one event per state transition after the write
//! succeeds. Publishing is fire-and-forget: [`EventPublisher::publish`] has
//! no error channel.

use crate::domain::{DonationStatus, PrayerVisibility, Role, StringUuid};
use crate::queue::JobQueue;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "community.post.created")]
    CommunityPostCreated,
    #[serde(rename = "event.created")]
    EventCreated,
    #[serde(rename = "prayer.request.created")]
    PrayerRequestCreated,
    #[serde(rename = "sermon.published")]
    SermonPublished,
    #[serde(rename = "worship.set.scheduled")]
    WorshipSetScheduled,
    #[serde(rename = "member.joined.tenant")]
    MemberJoinedTenant,
    #[serde(rename = "donation.status.updated")]
    DonationStatusUpdated,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::CommunityPostCreated => "community.post.created",
            EventName::EventCreated => "event.created",
            EventName::PrayerRequestCreated => "prayer.request.created",
            EventName::SermonPublished => "sermon.published",
            EventName::WorshipSetScheduled => "worship.set.scheduled",
            EventName::MemberJoinedTenant => "member.joined.tenant",
            EventName::DonationStatusUpdated => "donation.status.updated",
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tenant-scoped domain event. Every variant carries the tenant, the acting
/// user and the time of the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum DomainEvent {
    #[serde(rename = "community.post.created")]
    CommunityPostCreated {
        tenant_id: StringUuid,
        user_id: StringUuid,
        timestamp: DateTime<Utc>,
        post_id: StringUuid,
        content: String,
        author_name: String,
    },
    #[serde(rename = "event.created")]
    EventCreated {
        tenant_id: StringUuid,
        user_id: StringUuid,
        timestamp: DateTime<Utc>,
        event_id: StringUuid,
        title: String,
        start_date: DateTime<Utc>,
    },
    #[serde(rename = "prayer.request.created")]
    PrayerRequestCreated {
        tenant_id: StringUuid,
        user_id: StringUuid,
        timestamp: DateTime<Utc>,
        prayer_id: StringUuid,
        title: String,
        visibility: PrayerVisibility,
        group_ids: Vec<String>,
    },
    #[serde(rename = "sermon.published")]
    SermonPublished {
        tenant_id: StringUuid,
        user_id: StringUuid,
        timestamp: DateTime<Utc>,
        sermon_id: StringUuid,
        title: String,
        speaker: String,
    },
    #[serde(rename = "worship.set.scheduled")]
    WorshipSetScheduled {
        tenant_id: StringUuid,
        user_id: StringUuid,
        timestamp: DateTime<Utc>,
        worship_id: StringUuid,
        title: String,
        scheduled_for: Option<DateTime<Utc>>,
    },
    #[serde(rename = "member.joined.tenant")]
    MemberJoinedTenant {
        tenant_id: StringUuid,
        user_id: StringUuid,
        timestamp: DateTime<Utc>,
        member_name: String,
        role: Role,
    },
    #[serde(rename = "donation.status.updated")]
    DonationStatusUpdated {
        tenant_id: StringUuid,
        user_id: StringUuid,
        timestamp: DateTime<Utc>,
        donation_id: StringUuid,
        amount: f64,
        status: DonationStatus,
    },
}

impl DomainEvent {
    pub fn name(&self) -> EventName {
        match self {
            DomainEvent::CommunityPostCreated { .. } => EventName::CommunityPostCreated,
            DomainEvent::EventCreated { .. } => EventName::EventCreated,
            DomainEvent::PrayerRequestCreated { .. } => EventName::PrayerRequestCreated,
            DomainEvent::SermonPublished { .. } => EventName::SermonPublished,
            DomainEvent::WorshipSetScheduled { .. } => EventName::WorshipSetScheduled,
            DomainEvent::MemberJoinedTenant { .. } => EventName::MemberJoinedTenant,
            DomainEvent::DonationStatusUpdated { .. } => EventName::DonationStatusUpdated,
        }
    }

    pub fn tenant_id(&self) -> StringUuid {
        match self {
            DomainEvent::CommunityPostCreated { tenant_id, .. }
            | DomainEvent::EventCreated { tenant_id, .. }
            | DomainEvent::PrayerRequestCreated { tenant_id, .. }
            | DomainEvent::SermonPublished { tenant_id, .. }
            | DomainEvent::WorshipSetScheduled { tenant_id, .. }
            | DomainEvent::MemberJoinedTenant { tenant_id, .. }
            | DomainEvent::DonationStatusUpdated { tenant_id, .. } => *tenant_id,
        }
    }

    pub fn user_id(&self) -> StringUuid {
        match self {
            DomainEvent::CommunityPostCreated { user_id, .. }
            | DomainEvent::EventCreated { user_id, .. }
            | DomainEvent::PrayerRequestCreated { user_id, .. }
            | DomainEvent::SermonPublished { user_id, .. }
            | DomainEvent::WorshipSetScheduled { user_id, .. }
            | DomainEvent::MemberJoinedTenant { user_id, .. }
            | DomainEvent::DonationStatusUpdated { user_id, .. } => *user_id,
        }
    }
}

/// Fire-and-forget publish capability handed to feature services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent);
}

/// Publishes every event onto the shared notifications queue
pub struct QueueEventPublisher {
    queue: Arc<dyn JobQueue>,
    queue_name: String,
}

impl QueueEventPublisher {
    pub fn new(queue: Arc<dyn JobQueue>, queue_name: impl Into<String>) -> Self {
        Self {
            queue,
            queue_name: queue_name.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for QueueEventPublisher {
    async fn publish(&self, event: DomainEvent) {
        let name = event.name();
        let tenant_id = event.tenant_id();

        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(event = %name, tenant_id = %tenant_id, error = %e, "Failed to serialize domain event");
                record(name, false);
                return;
            }
        };

        match self
            .queue
            .enqueue(&self.queue_name, name.as_str(), payload)
            .await
        {
            Ok(job_id) => {
                tracing::info!(event = %name, tenant_id = %tenant_id, job_id = %job_id, "Domain event published");
                record(name, true);
            }
            Err(e) => {
                tracing::error!(event = %name, tenant_id = %tenant_id, error = %e, "Failed to publish domain event");
                record(name, false);
            }
        }
    }
}

fn record(name: EventName, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::counter!(
        "ecclesia_events_published_total",
        "event" => name.as_str(),
        "result" => result
    )
    .increment(1);
}
