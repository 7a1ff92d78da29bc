use crate::models::errors::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum number of requests allowed in the time window
    pub max_requests: usize,
    /// Time window for rate limiting
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window_duration: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct RequestRecord {
    timestamps: Vec<SystemTime>,
}

impl RequestRecord {
    /// Removes timestamps outside the window
    fn cleanup(&mut self, window_duration: Duration) {
        let now = SystemTime::now();
        self.timestamps.retain(|&timestamp| {
            now.duration_since(timestamp)
                .map(|elapsed| elapsed < window_duration)
                .unwrap_or(false)
        });
    }
}

/// Sliding-window limiter keyed by client identifier
#[derive(Clone)]
pub struct RateLimiter {
    records: Arc<RwLock<HashMap<String, RequestRecord>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Records a request from `identifier`, failing once the window is full
    pub async fn check_rate_limit(&self, identifier: &str) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        let record = records.entry(identifier.to_string()).or_default();

        record.cleanup(self.config.window_duration);

        if record.timestamps.len() >= self.config.max_requests {
            tracing::warn!("Rate limit exceeded for {}", identifier);
            return Err(AppError::rate_limited(format!(
                "{} requests per {} seconds",
                self.config.max_requests,
                self.config.window_duration.as_secs()
            )));
        }

        record.timestamps.push(SystemTime::now());
        Ok(())
    }

    pub async fn get_remaining_requests(&self, identifier: &str) -> usize {
        let mut records = self.records.write().await;
        let used = match records.get_mut(identifier) {
            Some(record) => {
                record.cleanup(self.config.window_duration);
                record.timestamps.len()
            }
            None => 0,
        };
        self.config.max_requests.saturating_sub(used)
    }

    /// Drops records with nothing left in the window
    pub async fn cleanup_expired(&self) -> usize {
        let mut records = self.records.write().await;
        let initial_count = records.len();

        for record in records.values_mut() {
            record.cleanup(self.config.window_duration);
        }
        records.retain(|_, record| !record.timestamps.is_empty());

        let removed_count = initial_count - records.len();
        if removed_count > 0 {
            tracing::debug!("Cleaned up {} expired rate limit records", removed_count);
        }
        removed_count
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
