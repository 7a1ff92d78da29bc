//! Persistence contract and the in-memory backend.
//!
//! The traits only require "insert with uniqueness enforcement", "find by
//! exact key" and "delete by key". Uniqueness violations come back as
//! [`StoreError::Conflict`] so callers can treat them as an expected outcome.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::collection::{Collection, CollectionChanges};
use crate::models::content::Content;
use crate::models::follow::Follow;
use crate::models::share_link::ShareLink;
use crate::models::user::User;

/// A uniquely-indexed field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Username,
    ShareToken,
    ShareOwner,
    Follow,
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueKey::Username => f.write_str("username"),
            UniqueKey::ShareToken => f.write_str("share token"),
            UniqueKey::ShareOwner => f.write_str("share link owner"),
            UniqueKey::Follow => f.write_str("follow"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("uniqueness violation on {0}")]
    Conflict(UniqueKey),

    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable { message: message.into() }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; fails with `Conflict(Username)` if the name is taken
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_content(&self, content: Content) -> Result<(), StoreError>;
    async fn content_by_id(&self, id: Uuid) -> Result<Option<Content>, StoreError>;
    /// All of `owner_id`'s content, newest first
    async fn content_for_owner(&self, owner_id: Uuid) -> Result<Vec<Content>, StoreError>;
    async fn count_content(&self, owner_id: Uuid) -> Result<usize, StoreError>;
    /// Delete `id` only if it belongs to `owner_id`, dropping it from the
    /// owner's collections too; true if something was removed
    async fn delete_content(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError>;
}

/// Collections are always addressed through their owner, so another user's
/// collection reads as absent.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn insert_collection(&self, collection: Collection) -> Result<(), StoreError>;
    /// The owner's collections by ascending `order`, newest first on ties
    async fn collections_for_owner(&self, owner_id: Uuid) -> Result<Vec<Collection>, StoreError>;
    async fn collection_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Collection>, StoreError>;
    async fn update_collection(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: CollectionChanges,
    ) -> Result<Option<Collection>, StoreError>;
    async fn delete_collection(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError>;
    /// Adds `content_id` unless it is already a member
    async fn add_to_collection(
        &self,
        owner_id: Uuid,
        id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<Collection>, StoreError>;
    async fn remove_from_collection(
        &self,
        owner_id: Uuid,
        id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<Collection>, StoreError>;
    /// Sets each listed collection's `order` to its position in `ids`,
    /// skipping ids the owner doesn't have; returns how many were updated
    async fn reorder_collections(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait FollowStore: Send + Sync {
    /// Fails with `Conflict(Follow)` if the pair already exists
    async fn insert_follow(&self, follow: Follow) -> Result<(), StoreError>;
    async fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, StoreError>;
    async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, StoreError>;
    /// Who follows `user_id`, oldest follow first
    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError>;
    /// Whom `user_id` follows, oldest follow first
    async fn followees_of(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError>;
}

#[async_trait]
pub trait ShareLinkStore: Send + Sync {
    async fn share_link_for_owner(&self, owner_id: Uuid) -> Result<Option<ShareLink>, StoreError>;
    async fn share_link_by_token(&self, token: &str) -> Result<Option<ShareLink>, StoreError>;
    /// Insert enforcing both unique indexes: `token` and `owner_id`
    async fn insert_share_link(&self, link: ShareLink) -> Result<(), StoreError>;
    /// Remove the owner's link; true if one existed
    async fn delete_share_link_for_owner(&self, owner_id: Uuid) -> Result<bool, StoreError>;
}

/// A complete storage handle with an explicit lifecycle
#[async_trait]
pub trait Store: UserStore + ContentStore + ShareLinkStore + CollectionStore + FollowStore {
    /// Release the handle; subsequent operations fail with `Unavailable`
    async fn close(&self) -> Result<(), StoreError>;
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    users_by_name: HashMap<String, Uuid>,
    // insertion order, oldest first
    content: Vec<Content>,
    links_by_token: HashMap<String, ShareLink>,
    tokens_by_owner: HashMap<Uuid, String>,
    collections: HashMap<Uuid, Collection>,
    // creation order, oldest first
    follows: Vec<Follow>,
}

impl Tables {
    fn owned_collection(&mut self, owner_id: Uuid, id: Uuid) -> Option<&mut Collection> {
        self.collections
            .get_mut(&id)
            .filter(|collection| collection.owner_id == owner_id)
    }
}

/// Store backed by process memory.
///
/// All tables sit behind a single lock so the unique indexes are checked and
/// updated atomically with the insert.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    closed: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::unavailable("store has been closed"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        if tables.users_by_name.contains_key(&user.username) {
            return Err(StoreError::Conflict(UniqueKey::Username));
        }
        tables.users_by_name.insert(user.username.clone(), user.id);
        tables.users.insert(user.id, user);
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.ensure_open()?;
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().await;
        Ok(tables
            .users_by_name
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert_content(&self, content: Content) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.tables.write().await.content.push(content);
        Ok(())
    }

    async fn content_for_owner(&self, owner_id: Uuid) -> Result<Vec<Content>, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().await;
        let mut items: Vec<Content> = tables
            .content
            .iter()
            .rev()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        // stable: equal timestamps keep newest-inserted first
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn count_content(&self, owner_id: Uuid) -> Result<usize, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().await;
        Ok(tables.content.iter().filter(|c| c.owner_id == owner_id).count())
    }

    async fn content_by_id(&self, id: Uuid) -> Result<Option<Content>, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().await;
        Ok(tables.content.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_content(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        let before = tables.content.len();
        tables.content.retain(|c| !(c.id == id && c.owner_id == owner_id));
        if tables.content.len() == before {
            return Ok(false);
        }
        for collection in tables.collections.values_mut() {
            if collection.owner_id == owner_id {
                collection.content_ids.retain(|member| *member != id);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn insert_collection(&self, collection: Collection) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.tables
            .write()
            .await
            .collections
            .insert(collection.id, collection);
        Ok(())
    }

    async fn collections_for_owner(&self, owner_id: Uuid) -> Result<Vec<Collection>, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().await;
        let mut collections: Vec<Collection> = tables
            .collections
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        collections.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(collections)
    }

    async fn collection_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Collection>, StoreError> {
        self.ensure_open()?;
        Ok(self
            .tables
            .read()
            .await
            .collections
            .get(&id)
            .filter(|c| c.owner_id == owner_id)
            .cloned())
    }

    async fn update_collection(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: CollectionChanges,
    ) -> Result<Option<Collection>, StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        Ok(tables.owned_collection(owner_id, id).map(|collection| {
            collection.apply(&changes);
            collection.clone()
        }))
    }

    async fn delete_collection(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        if tables.owned_collection(owner_id, id).is_none() {
            return Ok(false);
        }
        Ok(tables.collections.remove(&id).is_some())
    }

    async fn add_to_collection(
        &self,
        owner_id: Uuid,
        id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<Collection>, StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        Ok(tables.owned_collection(owner_id, id).map(|collection| {
            if !collection.content_ids.contains(&content_id) {
                collection.content_ids.push(content_id);
                collection.updated_at = chrono::Utc::now();
            }
            collection.clone()
        }))
    }

    async fn remove_from_collection(
        &self,
        owner_id: Uuid,
        id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<Collection>, StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        Ok(tables.owned_collection(owner_id, id).map(|collection| {
            let before = collection.content_ids.len();
            collection.content_ids.retain(|member| *member != content_id);
            if collection.content_ids.len() != before {
                collection.updated_at = chrono::Utc::now();
            }
            collection.clone()
        }))
    }

    async fn reorder_collections(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<usize, StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for (position, id) in ids.iter().enumerate() {
            if let Some(collection) = tables.owned_collection(owner_id, *id) {
                collection.order = u32::try_from(position).unwrap_or(u32::MAX);
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl FollowStore for MemoryStore {
    async fn insert_follow(&self, follow: Follow) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        if tables.follows.iter().any(|f| {
            f.follower_id == follow.follower_id && f.followee_id == follow.followee_id
        }) {
            return Err(StoreError::Conflict(UniqueKey::Follow));
        }
        tables.follows.push(follow);
        Ok(())
    }

    async fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.followee_id == followee_id));
        Ok(tables.follows.len() != before)
    }

    async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.followee_id == followee_id))
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.followee_id == user_id)
            .map(|f| f.follower_id)
            .collect())
    }

    async fn followees_of(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.followee_id)
            .collect())
    }
}

#[async_trait]
impl ShareLinkStore for MemoryStore {
    async fn share_link_for_owner(&self, owner_id: Uuid) -> Result<Option<ShareLink>, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().await;
        Ok(tables
            .tokens_by_owner
            .get(&owner_id)
            .and_then(|token| tables.links_by_token.get(token))
            .cloned())
    }

    async fn share_link_by_token(&self, token: &str) -> Result<Option<ShareLink>, StoreError> {
        self.ensure_open()?;
        Ok(self.tables.read().await.links_by_token.get(token).cloned())
    }

    async fn insert_share_link(&self, link: ShareLink) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        if tables.links_by_token.contains_key(&link.token) {
            return Err(StoreError::Conflict(UniqueKey::ShareToken));
        }
        if tables.tokens_by_owner.contains_key(&link.owner_id) {
            return Err(StoreError::Conflict(UniqueKey::ShareOwner));
        }
        tables.tokens_by_owner.insert(link.owner_id, link.token.clone());
        tables.links_by_token.insert(link.token.clone(), link);
        Ok(())
    }

    async fn delete_share_link_for_owner(&self, owner_id: Uuid) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;
        match tables.tokens_by_owner.remove(&owner_id) {
            Some(token) => {
                tables.links_by_token.remove(&token);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn close(&self) -> Result<(), StoreError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            let tables = self.tables.read().await;
            tracing::info!(
                "Closed memory store ({} users, {} content items, {} share links, {} collections)",
                tables.users.len(),
                tables.content.len(),
                tables.links_by_token.len(),
                tables.collections.len()
            );
        }
        Ok(())
    }
}
