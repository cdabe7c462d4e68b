//! Worship set planning

use super::common::{timestamp, Document, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorshipSetItem {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(range(min = 0))]
    pub order: i32,
    pub key_override: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorshipSet {
    pub title: String,
    pub description: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Calendar event this set is planned for
    pub event_id: Option<StringUuid>,
    #[serde(default)]
    pub items: Vec<WorshipSetItem>,
    pub leader_id: Option<StringUuid>,
    #[serde(default)]
    pub team_members: Vec<StringUuid>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    pub created_by: StringUuid,
}

impl Document for WorshipSet {
    const COLLECTION: &'static str = "worship_sets";
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorshipSetInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub event_id: Option<StringUuid>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<WorshipSetItem>,
    pub leader_id: Option<StringUuid>,
    #[serde(default)]
    pub team_members: Vec<StringUuid>,
    pub notes: Option<String>,
}

impl CreateWorshipSetInput {
    pub fn into_set(self, created_by: StringUuid) -> WorshipSet {
        WorshipSet {
            title: self.title,
            description: self.description,
            scheduled_at: self.scheduled_at,
            event_id: self.event_id,
            items: self.items,
            leader_id: self.leader_id,
            team_members: self.team_members,
            notes: self.notes,
            is_published: false,
            published_at: None,
            created_by,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorshipSetInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(nested)]
    pub items: Option<Vec<WorshipSetItem>>,
    pub leader_id: Option<StringUuid>,
    pub team_members: Option<Vec<StringUuid>>,
    pub notes: Option<String>,
}
