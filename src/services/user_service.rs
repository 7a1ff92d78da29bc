use regex::Regex;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::errors::AppError;
use crate::models::user::{Profile, User};
use crate::services::password::PasswordHasher;
use crate::services::store::{ContentStore, FollowStore, Store, UserStore};

const MIN_USERNAME_LENGTH: usize = 3;
const MIN_PASSWORD_LENGTH: usize = 6;
const DUMMY_PASSWORD: &str = "linkvault-no-such-account";

/// Sign-up, credential checks and profile lookup
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    content: Arc<dyn ContentStore>,
    follows: Arc<dyn FollowStore>,
    hasher: PasswordHasher,
    /// Verified against when the username is unknown
    dummy_hash: String,
    email_pattern: Regex,
}

impl UserService {
    pub fn new<S: Store + 'static>(store: Arc<S>) -> Result<Self, AppError> {
        let email_pattern = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .map_err(|e| AppError::internal_error(format!("Invalid email pattern: {e}")))?;
        let hasher = PasswordHasher::new();
        let dummy_hash = hasher.hash_password(DUMMY_PASSWORD)?;
        Ok(Self {
            users: store.clone(),
            content: store.clone(),
            follows: store,
            hasher,
            dummy_hash,
            email_pattern,
        })
    }

    /// Usernames are email addresses, compared case-insensitively
    pub fn normalize_username(username: &str) -> String {
        username.trim().to_lowercase()
    }

    fn validate_signup(&self, username: &str, password: &str) -> Result<(), AppError> {
        let mut problems = Vec::new();
        if username.chars().count() < MIN_USERNAME_LENGTH {
            problems.push(format!(
                "Username must be at least {} characters long",
                MIN_USERNAME_LENGTH
            ));
        }
        if !self.email_pattern.is_match(username) {
            problems.push("Must be a valid email address".to_string());
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            problems.push(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            ));
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation_failed(problems.join("; ")))
        }
    }

    /// Registers a new account
    pub async fn signup(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = Self::normalize_username(username);
        self.validate_signup(&username, password)?;

        if self.users.user_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("A user with this email already exists"));
        }

        let user = User::new(username, self.hasher.hash_password(password)?);
        // the unique index still decides if two sign-ups race
        self.users.insert_user(user.clone()).await?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Checks credentials; unknown user and wrong password look the same
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation_failed(
                "Username and password are required",
            ));
        }

        let invalid = || AppError::unauthorized("Invalid email or password");
        let user = self
            .users
            .user_by_username(&Self::normalize_username(username))
            .await?;

        match user {
            Some(user) if self.hasher.verify_password(password, &user.password_hash)? => Ok(user),
            Some(_) => Err(invalid()),
            None => {
                // unknown users cost the same Argon2 verify as a wrong password
                self.hasher.verify_password(password, &self.dummy_hash)?;
                Err(invalid())
            }
        }
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Profile, AppError> {
        let user = self
            .users
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let content_count = self.content.count_content(user_id).await?;
        let follower_count = self.follows.followers_of(user_id).await?.len();
        let following_count = self.follows.followees_of(user_id).await?.len();

        Ok(Profile {
            id: user.id,
            username: user.username,
            bio: user.bio,
            created_at: user.created_at,
            content_count,
            follower_count,
            following_count,
        })
    }
}
