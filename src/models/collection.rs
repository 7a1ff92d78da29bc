use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::Content;

pub const DEFAULT_COLOR: &str = "#8B5CF6";
pub const DEFAULT_ICON: &str = "📁";

/// A user-curated, ordered grouping of their own saved links
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    pub is_private: bool,
    /// Position among the owner's collections, lowest first
    pub order: u32,
    /// Member content ids, each at most once, in the order they were added
    pub content_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(owner_id: Uuid, name: &str, order: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.trim().to_string(),
            description: String::new(),
            color: DEFAULT_COLOR.to_string(),
            icon: DEFAULT_ICON.to_string(),
            is_private: false,
            order,
            content_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `changes`
    pub fn apply(&mut self, changes: &CollectionChanges) {
        if let Some(name) = &changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(color) = &changes.color {
            self.color = color.clone();
        }
        if let Some(icon) = &changes.icon {
            self.icon = icon.clone();
        }
        if let Some(is_private) = changes.is_private {
            self.is_private = is_private;
        }
        if let Some(order) = changes.order {
            self.order = order;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update of a collection's own fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_private: Option<bool>,
    pub order: Option<u32>,
}

/// A collection as listed: counts plus the first few members
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    pub is_private: bool,
    pub order: u32,
    pub content_count: usize,
    pub content_preview: Vec<Content>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single collection with every member resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    pub is_private: bool,
    pub order: u32,
    pub content: Vec<Content>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CollectionSummary {
    pub fn new(collection: Collection, content_preview: Vec<Content>) -> Self {
        Self {
            id: collection.id,
            content_count: collection.content_ids.len(),
            name: collection.name,
            description: collection.description,
            color: collection.color,
            icon: collection.icon,
            is_private: collection.is_private,
            order: collection.order,
            content_preview,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}

impl CollectionDetail {
    pub fn new(collection: Collection, content: Vec<Content>) -> Self {
        Self {
            id: collection.id,
            name: collection.name,
            description: collection.description,
            color: collection.color,
            icon: collection.icon,
            is_private: collection.is_private,
            order: collection.order,
            content,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}
