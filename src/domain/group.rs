//! Small groups and ministries

use super::common::{Document, StringUuid};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupCategory {
    SmallGroup,
    Ministry,
    BibleStudy,
    YouthGroup,
    PrayerGroup,
    Choir,
    #[default]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: GroupCategory,
    pub image: Option<String>,
    pub leader_id: StringUuid,
    #[serde(default)]
    pub members: Vec<StringUuid>,
    pub meeting_schedule: Option<String>,
    pub meeting_location: Option<String>,
    /// 0 means unlimited
    #[serde(default)]
    pub max_members: i32,
    #[serde(default = "default_true")]
    pub is_open: bool,
    pub created_by: StringUuid,
}

fn default_true() -> bool {
    true
}

impl Document for Group {
    const COLLECTION: &'static str = "church_groups";
}

impl Group {
    pub fn is_full(&self) -> bool {
        self.max_members > 0 && self.members.len() >= self.max_members as usize
    }

    pub fn has_member(&self, user_id: StringUuid) -> bool {
        self.members.contains(&user_id)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    pub category: GroupCategory,
    pub image: Option<String>,
    #[validate(length(max = 255))]
    pub meeting_schedule: Option<String>,
    #[validate(length(max = 255))]
    pub meeting_location: Option<String>,
    #[validate(range(min = 0))]
    pub max_members: Option<i32>,
    pub is_open: Option<bool>,
}

impl CreateGroupInput {
    /// The creator leads the group and is its first member
    pub fn into_group(self, created_by: StringUuid) -> Group {
        Group {
            name: self.name,
            description: self.description,
            category: self.category,
            image: self.image,
            leader_id: created_by,
            members: vec![created_by],
            meeting_schedule: self.meeting_schedule,
            meeting_location: self.meeting_location,
            max_members: self.max_members.unwrap_or(0),
            is_open: self.is_open.unwrap_or(true),
            created_by,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub category: Option<GroupCategory>,
    pub image: Option<String>,
    #[validate(length(max = 255))]
    pub meeting_schedule: Option<String>,
    #[validate(length(max = 255))]
    pub meeting_location: Option<String>,
    #[validate(range(min = 0))]
    pub max_members: Option<i32>,
    pub is_open: Option<bool>,
}
