//! Community feed posts

use super::common::{Document, StringUuid};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub author_id: StringUuid,
    pub author_name: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub likes: Vec<StringUuid>,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub is_pinned: bool,
}

impl Document for Post {
    const COLLECTION: &'static str = "posts";
}

impl Post {
    /// Adds the like if absent, removes it otherwise
    pub fn toggle_like(&mut self, user_id: StringUuid) {
        if let Some(index) = self.likes.iter().position(|id| *id == user_id) {
            self.likes.remove(index);
        } else {
            self.likes.push(user_id);
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub images: Vec<String>,
}
