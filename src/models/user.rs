use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with generated ID and current timestamp
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            bio: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// Public view of a user's own account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub content_count: usize,
    pub follower_count: usize,
    pub following_count: usize,
}

/// What other users see in follower and following lists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub bio: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            bio: user.bio,
        }
    }
}
