use crate::models::errors::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A signed-in user's bearer session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: SystemTime,
    pub last_accessed: SystemTime,
}

impl Session {
    /// Creates a new session for `user_id`
    pub fn new(user_id: Uuid) -> Self {
        let now = SystemTime::now();
        Self {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: now,
            last_accessed: now,
        }
    }

    /// Updates the last accessed time
    pub fn touch(&mut self) {
        self.last_accessed = SystemTime::now();
    }

    /// Checks if the session has expired
    pub fn is_expired(&self, expiry_duration: Duration) -> bool {
        if let Ok(elapsed) = self.last_accessed.elapsed() {
            elapsed > expiry_duration
        } else {
            true
        }
    }
}

/// Bearer sessions with sliding expiry
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    expiry_duration: Duration,
}

impl SessionManager {
    /// Creates a new SessionManager with default expiry (1 day)
    pub fn new() -> Self {
        Self::with_expiry(Duration::from_secs(24 * 3600))
    }

    /// Creates a new SessionManager with custom expiry duration
    pub fn with_expiry(expiry_duration: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            expiry_duration,
        }
    }

    /// Creates a new session and returns its bearer token
    pub async fn create_session(&self, user_id: Uuid) -> String {
        let session = Session::new(user_id);
        let token = session.token.clone();

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session);

        tracing::debug!("Created new session for user {}", user_id);
        token
    }

    /// Resolves a bearer token to its user, refreshing the session
    pub async fn authenticate(&self, token: &str) -> Result<Uuid, AppError> {
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(token) {
            Some(session) if !session.is_expired(self.expiry_duration) => {
                session.touch();
                Ok(session.user_id)
            }
            Some(_) => {
                sessions.remove(token);
                Err(AppError::unauthorized(
                    "Your session is not valid. Please log in again.",
                ))
            }
            None => Err(AppError::unauthorized(
                "Your session is not valid. Please log in again.",
            )),
        }
    }

    /// Destroys a session
    pub async fn destroy_session(&self, token: &str) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.remove(token) {
            tracing::debug!("Destroyed session for user {}", session.user_id);
            Ok(())
        } else {
            Err(AppError::unauthorized("Session not found"))
        }
    }

    /// Cleans up expired sessions
    pub async fn cleanup_expired_sessions(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();

        sessions.retain(|_, session| !session.is_expired(self.expiry_duration));

        let removed_count = initial_count - sessions.len();

        if removed_count > 0 {
            tracing::info!("Cleaned up {} expired sessions", removed_count);
        }

        removed_count
    }

    /// Gets the number of active sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let manager = SessionManager::new();
        let user = Uuid::new_v4();
        let token = manager.create_session(user).await;

        assert_eq!(manager.authenticate(&token).await.unwrap(), user);
        assert_eq!(manager.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let manager = SessionManager::new();
        let err = manager.authenticate("bogus").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_destroy_session() {
        let manager = SessionManager::new();
        let token = manager.create_session(Uuid::new_v4()).await;

        assert!(manager.destroy_session(&token).await.is_ok());
        assert!(manager.authenticate(&token).await.is_err());
        assert!(manager.destroy_session(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_session_expiry() {
        let manager = SessionManager::with_expiry(Duration::from_millis(100));
        let token = manager.create_session(Uuid::new_v4()).await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(manager.authenticate(&token).await.is_err());
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let manager = SessionManager::with_expiry(Duration::from_millis(100));
        manager.create_session(Uuid::new_v4()).await;
        manager.create_session(Uuid::new_v4()).await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(manager.cleanup_expired_sessions().await, 2);
    }
}
