use std::sync::Arc;
use uuid::Uuid;

use crate::models::errors::AppError;
use crate::models::follow::Follow;
use crate::models::user::UserSummary;
use crate::services::store::{FollowStore, Store, StoreError, UniqueKey, UserStore};

/// Directed follow relationships between users
#[derive(Clone)]
pub struct FollowService {
    follows: Arc<dyn FollowStore>,
    users: Arc<dyn UserStore>,
}

impl FollowService {
    pub fn new<S: Store + 'static>(store: Arc<S>) -> Self {
        Self {
            follows: store.clone(),
            users: store,
        }
    }

    async fn require_user(&self, user_id: Uuid) -> Result<(), AppError> {
        match self.users.user_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("User not found")),
        }
    }

    async fn summaries(&self, ids: Vec<Uuid>) -> Result<Vec<UserSummary>, AppError> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            // accounts that are gone simply drop out of the list
            if let Some(user) = self.users.user_by_id(id).await? {
                users.push(UserSummary::from(user));
            }
        }
        Ok(users)
    }

    pub async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<(), AppError> {
        if follower_id == followee_id {
            return Err(AppError::validation_failed("You cannot follow yourself"));
        }
        self.require_user(followee_id).await?;

        match self.follows.insert_follow(Follow::new(follower_id, followee_id)).await {
            Ok(()) => {
                tracing::debug!("User {} followed {}", follower_id, followee_id);
                Ok(())
            }
            Err(StoreError::Conflict(UniqueKey::Follow)) => {
                Err(AppError::conflict("Already following this user"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removing a follow that doesn't exist is not an error
    pub async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<(), AppError> {
        if follower_id == followee_id {
            return Err(AppError::validation_failed("Invalid operation"));
        }
        if self.follows.delete_follow(follower_id, followee_id).await? {
            tracing::debug!("User {} unfollowed {}", follower_id, followee_id);
        }
        Ok(())
    }

    pub async fn followers(&self, user_id: Uuid) -> Result<Vec<UserSummary>, AppError> {
        self.require_user(user_id).await?;
        let ids = self.follows.followers_of(user_id).await?;
        self.summaries(ids).await
    }

    pub async fn following(&self, user_id: Uuid) -> Result<Vec<UserSummary>, AppError> {
        self.require_user(user_id).await?;
        let ids = self.follows.followees_of(user_id).await?;
        self.summaries(ids).await
    }

    pub async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, AppError> {
        Ok(self.follows.is_following(follower_id, followee_id).await?)
    }
}
