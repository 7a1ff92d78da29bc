use regex::Regex;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::content::{Content, ContentType};
use crate::models::errors::AppError;
use crate::services::store::ContentStore;

/// Input for a new saved link
#[derive(Debug, Clone)]
pub struct NewContent {
    pub title: String,
    pub link: String,
    pub content_type: ContentType,
    pub tags: Vec<String>,
}

#[derive(Clone)]
pub struct ContentService {
    content: Arc<dyn ContentStore>,
    link_pattern: Regex,
}

impl ContentService {
    pub fn new(content: Arc<dyn ContentStore>) -> Result<Self, AppError> {
        let link_pattern = Regex::new(r"^https?://\S+$")
            .map_err(|e| AppError::internal_error(format!("Invalid link pattern: {e}")))?;
        Ok(Self {
            content,
            link_pattern,
        })
    }

    pub async fn add(&self, owner_id: Uuid, input: NewContent) -> Result<Content, AppError> {
        if input.title.trim().is_empty() {
            return Err(AppError::validation_failed("Content title is required"));
        }
        if !self.link_pattern.is_match(input.link.trim()) {
            return Err(AppError::validation_failed(
                "Content link must be an http or https URL",
            ));
        }

        let content = Content::new(
            owner_id,
            &input.title,
            &input.link,
            input.content_type,
            &input.tags,
        );
        self.content.insert_content(content.clone()).await?;

        tracing::debug!("User {} saved {} {}", owner_id, content.content_type, content.id);
        Ok(content)
    }

    /// The owner's content, newest first
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Content>, AppError> {
        Ok(self.content.content_for_owner(owner_id).await?)
    }

    /// Deletes one of the owner's items; someone else's item reads as absent
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        tracing::debug!("Delete request for {} by user {}", id, owner_id);
        if self.content.delete_content(owner_id, id).await? {
            Ok(())
        } else {
            Err(AppError::forbidden("Unauthorized or content not found"))
        }
    }
}
