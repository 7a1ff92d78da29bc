//! Share-link issuance, revocation and resolution.
//!
//! Each user has at most one share link. Tokens are random draws over a
//! configured alphabet; the store's unique index on the token is what keeps
//! them unique, the lookup before insert only avoids a wasted write.

use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::errors::AppError;
use crate::models::share_link::{ShareLink, SharedContent};
use crate::services::store::{
    ContentStore, ShareLinkStore, Store, StoreError, UniqueKey, UserStore,
};

pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";
pub const DEFAULT_TOKEN_LENGTH: usize = 10;
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Shape of generated tokens and the collision retry bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    pub alphabet: Vec<char>,
    pub length: usize,
    pub max_attempts: usize,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_TOKEN_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl TokenPolicy {
    /// Builds a policy, rejecting empty or repetitive alphabets and zero bounds
    pub fn new(alphabet: &str, length: usize, max_attempts: usize) -> Result<Self, AppError> {
        let chars: Vec<char> = alphabet.chars().collect();
        if chars.len() < 2 {
            return Err(AppError::validation_failed(
                "Share token alphabet needs at least two characters",
            ));
        }
        let mut unique = chars.clone();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() != chars.len() {
            return Err(AppError::validation_failed(
                "Share token alphabet contains repeated characters",
            ));
        }
        if length == 0 || max_attempts == 0 {
            return Err(AppError::validation_failed(
                "Share token length and attempt bound must be positive",
            ));
        }
        Ok(Self {
            alphabet: chars,
            length,
            max_attempts,
        })
    }

    /// True if `token` could have been produced under this policy
    #[cfg(test)]
    pub fn admits(&self, token: &str) -> bool {
        token.chars().count() == self.length && token.chars().all(|c| self.alphabet.contains(&c))
    }
}

/// Source of candidate tokens
pub trait TokenGenerator: Send + Sync {
    fn generate(&self, policy: &TokenPolicy) -> String;
}

/// Uniform draws from the thread-local CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self, policy: &TokenPolicy) -> String {
        let mut rng = rand::thread_rng();
        (0..policy.length)
            .map(|_| policy.alphabet[rng.gen_range(0..policy.alphabet.len())])
            .collect()
    }
}

#[derive(Clone)]
pub struct ShareTokenService {
    links: Arc<dyn ShareLinkStore>,
    users: Arc<dyn UserStore>,
    content: Arc<dyn ContentStore>,
    generator: Arc<dyn TokenGenerator>,
    policy: TokenPolicy,
}

impl ShareTokenService {
    pub fn new<S: Store + 'static>(store: Arc<S>, policy: TokenPolicy) -> Self {
        Self::from_parts(
            store.clone(),
            store.clone(),
            store,
            Arc::new(RandomTokenGenerator),
            policy,
        )
    }

    pub fn from_parts(
        links: Arc<dyn ShareLinkStore>,
        users: Arc<dyn UserStore>,
        content: Arc<dyn ContentStore>,
        generator: Arc<dyn TokenGenerator>,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            links,
            users,
            content,
            generator,
            policy,
        }
    }

    #[cfg(test)]
    pub fn with_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.generator = generator;
        self
    }

    #[cfg(test)]
    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// Returns the owner's share token, creating one if needed
    pub async fn issue(&self, owner_id: Uuid) -> Result<String, AppError> {
        if let Some(link) = self.links.share_link_for_owner(owner_id).await? {
            return Ok(link.token);
        }

        for attempt in 1..=self.policy.max_attempts {
            let candidate = self.generator.generate(&self.policy);

            if self.links.share_link_by_token(&candidate).await?.is_some() {
                tracing::debug!("Share token candidate already taken (attempt {})", attempt);
                continue;
            }

            match self
                .links
                .insert_share_link(ShareLink::new(owner_id, candidate.clone()))
                .await
            {
                Ok(()) => {
                    tracing::info!("Issued share link for user {}", owner_id);
                    return Ok(candidate);
                }
                Err(StoreError::Conflict(UniqueKey::ShareToken)) => {
                    tracing::warn!(
                        "Share token collided on insert (attempt {}/{})",
                        attempt,
                        self.policy.max_attempts
                    );
                }
                Err(StoreError::Conflict(UniqueKey::ShareOwner)) => {
                    // A concurrent issue for the same owner won the race.
                    if let Some(link) = self.links.share_link_for_owner(owner_id).await? {
                        return Ok(link.token);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(
            "Gave up issuing a share token for user {} after {} attempts",
            owner_id,
            self.policy.max_attempts
        );
        Err(AppError::TokenSpaceExhausted {
            attempts: self.policy.max_attempts,
        })
    }

    /// Deletes the owner's share link, if any
    pub async fn revoke(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.links.delete_share_link_for_owner(owner_id).await? {
            tracing::info!("Revoked share link for user {}", owner_id);
        }
        Ok(())
    }

    /// Looks up the owner behind `token` and returns their content, newest first
    pub async fn resolve(&self, token: &str) -> Result<SharedContent, AppError> {
        let link = self
            .links
            .share_link_by_token(token)
            .await?
            .ok_or(AppError::ShareLinkNotFound)?;

        let owner = match self.users.user_by_id(link.owner_id).await? {
            Some(owner) => owner,
            None => {
                tracing::warn!("Share link points at missing user {}", link.owner_id);
                return Err(AppError::ShareOwnerMissing {
                    owner_id: link.owner_id.to_string(),
                });
            }
        };

        let content = self.content.content_for_owner(owner.id).await?;
        Ok(SharedContent {
            username: owner.username,
            content,
        })
    }
}
