//! Church calendar events

use super::common::{timestamp, Document, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Worship,
    Prayer,
    Conference,
    Outreach,
    Youth,
    #[default]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurchEvent {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: EventCategory,
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub image: Option<String>,
    #[serde(default)]
    pub requires_registration: bool,
    #[serde(default)]
    pub attendees: Vec<StringUuid>,
    /// 0 means unlimited
    #[serde(default)]
    pub max_attendees: i32,
    #[serde(default = "default_true")]
    pub is_public: bool,
    pub created_by: StringUuid,
}

fn default_true() -> bool {
    true
}

impl Document for ChurchEvent {
    const COLLECTION: &'static str = "church_events";
}

impl ChurchEvent {
    pub fn is_full(&self) -> bool {
        self.max_attendees > 0 && self.attendees.len() >= self.max_attendees as usize
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_event_window"))]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    pub category: EventCategory,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[validate(length(max = 255))]
    pub location: String,
    pub image: Option<String>,
    pub requires_registration: Option<bool>,
    #[validate(range(min = 0))]
    pub max_attendees: Option<i32>,
    pub is_public: Option<bool>,
}

fn validate_event_window(input: &CreateEventInput) -> Result<(), ValidationError> {
    if input.end_date < input.start_date {
        return Err(ValidationError::new("end_date_before_start_date"));
    }
    Ok(())
}

impl CreateEventInput {
    pub fn into_event(self, created_by: StringUuid) -> ChurchEvent {
        ChurchEvent {
            title: self.title,
            description: self.description,
            category: self.category,
            start_date: self.start_date,
            end_date: self.end_date,
            location: self.location,
            image: self.image,
            requires_registration: self.requires_registration.unwrap_or(false),
            attendees: Vec::new(),
            max_attendees: self.max_attendees.unwrap_or(0),
            is_public: self.is_public.unwrap_or(true),
            created_by,
        }
    }
}
