//! Prayer requests

use super::common::{Document, StringUuid};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrayerCategory {
    Health,
    Family,
    Finance,
    Spiritual,
    Thanksgiving,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrayerStatus {
    #[default]
    Open,
    Answered,
    Closed,
}

/// Audience that should be notified about a new request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrayerVisibility {
    #[default]
    Everyone,
    Clergy,
    AdminClergy,
    Groups,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequest {
    pub user_id: StringUuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: PrayerCategory,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub visibility: PrayerVisibility,
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub status: PrayerStatus,
    #[serde(default)]
    pub prayed_by: Vec<StringUuid>,
    #[serde(default)]
    pub prayer_count: i64,
}

impl Document for PrayerRequest {
    const COLLECTION: &'static str = "prayer_requests";
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrayerInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[serde(default)]
    pub category: PrayerCategory,
    pub is_anonymous: Option<bool>,
    pub is_private: Option<bool>,
    pub visibility: Option<PrayerVisibility>,
    #[serde(default)]
    pub group_ids: Vec<String>,
}

impl CreatePrayerInput {
    pub fn into_request(self, user_id: StringUuid) -> PrayerRequest {
        PrayerRequest {
            user_id,
            title: self.title,
            description: self.description,
            category: self.category,
            is_anonymous: self.is_anonymous.unwrap_or(false),
            is_private: self.is_private.unwrap_or(false),
            visibility: self.visibility.unwrap_or_default(),
            group_ids: self.group_ids,
            status: PrayerStatus::Open,
            prayed_by: Vec::new(),
            prayer_count: 0,
        }
    }
}
