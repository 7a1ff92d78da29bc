use regex::Regex;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::collection::{
    Collection, CollectionChanges, CollectionDetail, CollectionSummary,
};
use crate::models::content::Content;
use crate::models::errors::AppError;
use crate::services::store::{CollectionStore, ContentStore, Store};

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;
const PREVIEW_SIZE: usize = 5;

/// Input for a new collection; absent fields take the defaults
#[derive(Debug, Clone, Default)]
pub struct NewCollection {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_private: Option<bool>,
}

/// Owner-scoped collections of saved links
#[derive(Clone)]
pub struct CollectionService {
    collections: Arc<dyn CollectionStore>,
    content: Arc<dyn ContentStore>,
    color_pattern: Regex,
}

fn not_found() -> AppError {
    AppError::not_found("Collection not found")
}

impl CollectionService {
    pub fn new<S: Store + 'static>(store: Arc<S>) -> Result<Self, AppError> {
        let color_pattern = Regex::new(r"^#[0-9A-Fa-f]{6}$")
            .map_err(|e| AppError::internal_error(format!("Invalid color pattern: {e}")))?;
        Ok(Self {
            collections: store.clone(),
            content: store,
            color_pattern,
        })
    }

    fn validate(
        &self,
        name: Option<&str>,
        description: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), AppError> {
        if let Some(name) = name {
            let length = name.trim().chars().count();
            if length == 0 {
                return Err(AppError::validation_failed("Name is required"));
            }
            if length > MAX_NAME_LENGTH {
                return Err(AppError::validation_failed("Name too long"));
            }
        }
        if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
            return Err(AppError::validation_failed("Description too long"));
        }
        if color.is_some_and(|c| !self.color_pattern.is_match(c)) {
            return Err(AppError::validation_failed("Invalid hex color"));
        }
        Ok(())
    }

    /// Members that still exist, in collection order
    async fn members(&self, ids: &[Uuid], limit: usize) -> Result<Vec<Content>, AppError> {
        let mut items = Vec::new();
        for id in ids {
            if items.len() == limit {
                break;
            }
            if let Some(item) = self.content.content_by_id(*id).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Creates a collection placed after the owner's existing ones
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: NewCollection,
    ) -> Result<CollectionSummary, AppError> {
        self.validate(
            Some(&input.name),
            input.description.as_deref(),
            input.color.as_deref(),
        )?;

        let order = self
            .collections
            .collections_for_owner(owner_id)
            .await?
            .iter()
            .map(|c| c.order.saturating_add(1))
            .max()
            .unwrap_or(0);

        let mut collection = Collection::new(owner_id, &input.name, order);
        if let Some(description) = input.description {
            collection.description = description;
        }
        if let Some(color) = input.color {
            collection.color = color;
        }
        if let Some(icon) = input.icon {
            collection.icon = icon;
        }
        collection.is_private = input.is_private.unwrap_or(false);

        self.collections.insert_collection(collection.clone()).await?;
        tracing::debug!("User {} created collection {}", owner_id, collection.id);
        Ok(CollectionSummary::new(collection, Vec::new()))
    }

    /// The owner's collections in display order, each with a short preview
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<CollectionSummary>, AppError> {
        let collections = self.collections.collections_for_owner(owner_id).await?;
        let mut summaries = Vec::with_capacity(collections.len());
        for collection in collections {
            let preview = self.members(&collection.content_ids, PREVIEW_SIZE).await?;
            summaries.push(CollectionSummary::new(collection, preview));
        }
        Ok(summaries)
    }

    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<CollectionDetail, AppError> {
        let collection = self
            .collections
            .collection_for_owner(owner_id, id)
            .await?
            .ok_or_else(not_found)?;
        let content = self.members(&collection.content_ids, usize::MAX).await?;
        Ok(CollectionDetail::new(collection, content))
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: CollectionChanges,
    ) -> Result<CollectionSummary, AppError> {
        self.validate(
            changes.name.as_deref(),
            changes.description.as_deref(),
            changes.color.as_deref(),
        )?;
        let collection = self
            .collections
            .update_collection(owner_id, id, changes)
            .await?
            .ok_or_else(not_found)?;
        let preview = self.members(&collection.content_ids, PREVIEW_SIZE).await?;
        Ok(CollectionSummary::new(collection, preview))
    }

    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if self.collections.delete_collection(owner_id, id).await? {
            tracing::debug!("User {} deleted collection {}", owner_id, id);
            Ok(())
        } else {
            Err(not_found())
        }
    }

    /// Adds one of the owner's own items; returns the new member count
    pub async fn add_content(
        &self,
        owner_id: Uuid,
        id: Uuid,
        content_id: Uuid,
    ) -> Result<usize, AppError> {
        match self.content.content_by_id(content_id).await? {
            Some(item) if item.owner_id == owner_id => {}
            _ => return Err(AppError::not_found("Content not found")),
        }
        let collection = self
            .collections
            .add_to_collection(owner_id, id, content_id)
            .await?
            .ok_or_else(not_found)?;
        Ok(collection.content_ids.len())
    }

    /// Removes a member if present; returns the new member count
    pub async fn remove_content(
        &self,
        owner_id: Uuid,
        id: Uuid,
        content_id: Uuid,
    ) -> Result<usize, AppError> {
        let collection = self
            .collections
            .remove_from_collection(owner_id, id, content_id)
            .await?
            .ok_or_else(not_found)?;
        Ok(collection.content_ids.len())
    }

    /// Puts the listed collections in the given order
    pub async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), AppError> {
        let updated = self.collections.reorder_collections(owner_id, ids).await?;
        if updated != ids.len() {
            tracing::debug!(
                "Reorder for user {} skipped {} unknown collections",
                owner_id,
                ids.len() - updated
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::ContentType;
    use crate::services::store::MemoryStore;

    fn service() -> (Arc<MemoryStore>, CollectionService) {
        let store = Arc::new(MemoryStore::new());
        let collections = CollectionService::new(store.clone()).unwrap();
        (store, collections)
    }

    fn named(name: &str) -> NewCollection {
        NewCollection {
            name: name.to_string(),
            ..NewCollection::default()
        }
    }

    async fn saved(store: &MemoryStore, owner: Uuid, title: &str) -> Content {
        let item = Content::new(owner, title, "https://a.io", ContentType::Article, &[]);
        store.insert_content(item.clone()).await.unwrap();
        item
    }

    #[tokio::test]
    async fn test_create_appends_to_order() {
        let (_, collections) = service();
        let owner = Uuid::new_v4();

        let first = collections.create(owner, named("Reading")).await.unwrap();
        let second = collections
            .create(
                owner,
                NewCollection {
                    name: "Videos".to_string(),
                    color: Some("#00ff00".to_string()),
                    is_private: Some(true),
                    ..NewCollection::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(first.order, 0);
        assert_eq!(second.order, 1);
        assert_eq!(second.color, "#00ff00");
        assert!(second.is_private);
        assert_eq!(first.color, crate::models::collection::DEFAULT_COLOR);

        let listed: Vec<String> = collections
            .list(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(listed, vec!["Reading", "Videos"]);
    }

    #[tokio::test]
    async fn test_validation() {
        let (_, collections) = service();
        let owner = Uuid::new_v4();

        for input in [
            named("   "),
            named(&"x".repeat(MAX_NAME_LENGTH + 1)),
            NewCollection {
                color: Some("purple".to_string()),
                ..named("ok")
            },
            NewCollection {
                description: Some("d".repeat(MAX_DESCRIPTION_LENGTH + 1)),
                ..named("ok")
            },
        ] {
            assert!(matches!(
                collections.create(owner, input).await.unwrap_err(),
                AppError::ValidationError { .. }
            ));
        }

        let created = collections.create(owner, named("ok")).await.unwrap();
        let err = collections
            .update(
                owner,
                created.id,
                CollectionChanges {
                    color: Some("#12345".to_string()),
                    ..CollectionChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_other_users_collections_read_as_missing() {
        let (store, collections) = service();
        let (owner, stranger) = (Uuid::new_v4(), Uuid::new_v4());
        let created = collections.create(owner, named("Mine")).await.unwrap();
        let item = saved(&store, stranger, "theirs").await;

        assert!(matches!(
            collections.get(stranger, created.id).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
        assert!(collections.delete(stranger, created.id).await.is_err());
        assert!(collections
            .add_content(stranger, created.id, item.id)
            .await
            .is_err());
        assert!(collections.list(stranger).await.unwrap().is_empty());

        // an item the caller doesn't own can't be added to their collection
        let err = collections
            .add_content(owner, created.id, item.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "Not found: Content not found");
    }

    #[tokio::test]
    async fn test_membership_and_preview() {
        let (store, collections) = service();
        let owner = Uuid::new_v4();
        let created = collections.create(owner, named("Reading")).await.unwrap();

        let mut items = Vec::new();
        for i in 0..7 {
            let item = saved(&store, owner, &format!("item {i}")).await;
            collections.add_content(owner, created.id, item.id).await.unwrap();
            items.push(item);
        }
        assert_eq!(
            collections.add_content(owner, created.id, items[0].id).await.unwrap(),
            7
        );

        let listed = collections.list(owner).await.unwrap();
        assert_eq!(listed[0].content_count, 7);
        assert_eq!(listed[0].content_preview.len(), PREVIEW_SIZE);
        assert_eq!(listed[0].content_preview[0].id, items[0].id);

        assert_eq!(
            collections.remove_content(owner, created.id, items[0].id).await.unwrap(),
            6
        );
        let detail = collections.get(owner, created.id).await.unwrap();
        assert_eq!(detail.content.len(), 6);
        assert_eq!(detail.content[0].id, items[1].id);
    }

    #[tokio::test]
    async fn test_update_delete_and_reorder() {
        let (_, collections) = service();
        let owner = Uuid::new_v4();
        let a = collections.create(owner, named("A")).await.unwrap();
        let b = collections.create(owner, named("B")).await.unwrap();

        let renamed = collections
            .update(
                owner,
                a.id,
                CollectionChanges {
                    name: Some("Alpha".to_string()),
                    ..CollectionChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Alpha");

        collections.reorder(owner, &[b.id, a.id]).await.unwrap();
        let names: Vec<String> = collections
            .list(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["B", "Alpha"]);

        collections.delete(owner, b.id).await.unwrap();
        assert!(matches!(
            collections.delete(owner, b.id).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
        assert_eq!(collections.list(owner).await.unwrap().len(), 1);
    }
}
