use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::Content;

/// A public, read-only pointer to one user's saved content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub token: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ShareLink {
    pub fn new(owner_id: Uuid, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            owner_id,
            created_at: Utc::now(),
        }
    }
}

/// What a visitor sees when opening a share link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedContent {
    pub username: String,
    pub content: Vec<Content>,
}
