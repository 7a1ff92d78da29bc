use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// A saved link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub link: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Video,
    Resource,
    Other,
    Youtube,
    Twitter,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Video => "video",
            ContentType::Resource => "resource",
            ContentType::Other => "other",
            ContentType::Youtube => "youtube",
            ContentType::Twitter => "twitter",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Content {
    /// Creates a new content item with generated ID and current timestamp.
    ///
    /// Title and link are trimmed; tags are trimmed, lowercased and
    /// de-duplicated (first occurrence wins), and blank tags are dropped.
    pub fn new(
        owner_id: Uuid,
        title: &str,
        link: &str,
        content_type: ContentType,
        tags: &[String],
    ) -> Self {
        Content {
            id: Uuid::new_v4(),
            owner_id,
            title: title.trim().to_string(),
            link: link.trim().to_string(),
            content_type,
            tags: normalize_tags(tags),
            created_at: Utc::now(),
        }
    }
}

pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}
