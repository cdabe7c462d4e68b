//! Sermon documents

use super::common::{timestamp, Document, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sermon {
    pub title: String,
    pub speaker: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub scripture_references: Vec<String>,
    /// Length in minutes
    pub duration: Option<i32>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: i64,
    pub created_by: StringUuid,
}

impl Document for Sermon {
    const COLLECTION: &'static str = "sermons";
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSermonInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub speaker: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[validate(url)]
    pub media_url: Option<String>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub scripture_references: Vec<String>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
}

impl CreateSermonInput {
    pub fn into_sermon(self, created_by: StringUuid) -> Sermon {
        Sermon {
            title: self.title,
            speaker: self.speaker,
            date: self.date,
            description: self.description,
            notes: self.notes,
            media_url: self.media_url,
            thumbnail_url: self.thumbnail_url,
            tags: self.tags,
            scripture_references: self.scripture_references,
            duration: self.duration,
            is_published: false,
            published_at: None,
            view_count: 0,
            created_by,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSermonInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub speaker: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[validate(url)]
    pub media_url: Option<String>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub scripture_references: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
}

/// Listing filters for `GET /sermons`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SermonQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub speaker: Option<String>,
    pub tag: Option<String>,
    pub is_published: Option<bool>,
}
