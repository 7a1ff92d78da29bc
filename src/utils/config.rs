use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::models::errors::AppError;
use crate::services::rate_limiter::RateLimitConfig;
use crate::services::share_token::{
    TokenPolicy, DEFAULT_ALPHABET, DEFAULT_MAX_ATTEMPTS, DEFAULT_TOKEN_LENGTH,
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
    pub cors_origins: Vec<String>,
    pub request_timeout_seconds: u64,
    pub session_ttl_seconds: u64,
    pub share_token_alphabet: String,
    pub share_token_length: usize,
    pub share_token_max_attempts: usize,
    pub auth_rate_limit_max_requests: usize,
    pub auth_rate_limit_window_seconds: u64,
    /// Key the auth rate limit on `X-Forwarded-For` instead of the socket peer
    pub trust_forwarded_for: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_body_size: 1024 * 1024, // 1MB
            cors_origins: vec!["*".to_string()],
            request_timeout_seconds: 30,
            session_ttl_seconds: 24 * 3600,
            share_token_alphabet: DEFAULT_ALPHABET.to_string(),
            share_token_length: DEFAULT_TOKEN_LENGTH,
            share_token_max_attempts: DEFAULT_MAX_ATTEMPTS,
            auth_rate_limit_max_requests: 20,
            auth_rate_limit_window_seconds: 15 * 60,
            trust_forwarded_for: false,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, target: &mut T) {
    if let Ok(raw) = env::var(name) {
        match raw.trim().parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }

        parse_var("PORT", &mut config.port);
        parse_var("MAX_BODY_SIZE", &mut config.max_body_size);

        if let Ok(origins) = env::var("CORS_ORIGINS") {
            config.cors_origins = origins.split(',').map(|s| s.trim().to_string()).collect();
        }

        parse_var("REQUEST_TIMEOUT_SECONDS", &mut config.request_timeout_seconds);
        parse_var("SESSION_TTL_SECONDS", &mut config.session_ttl_seconds);

        if let Ok(alphabet) = env::var("SHARE_TOKEN_ALPHABET") {
            config.share_token_alphabet = alphabet;
        }
        parse_var("SHARE_TOKEN_LENGTH", &mut config.share_token_length);
        parse_var("SHARE_TOKEN_MAX_ATTEMPTS", &mut config.share_token_max_attempts);

        parse_var("AUTH_RATE_LIMIT_MAX_REQUESTS", &mut config.auth_rate_limit_max_requests);
        parse_var("AUTH_RATE_LIMIT_WINDOW_SECONDS", &mut config.auth_rate_limit_window_seconds);
        parse_var("TRUST_PROXY", &mut config.trust_forwarded_for);

        if let Err(e) = config.token_policy() {
            tracing::warn!("Share token settings rejected ({}), using defaults", e);
            config.share_token_alphabet = DEFAULT_ALPHABET.to_string();
            config.share_token_length = DEFAULT_TOKEN_LENGTH;
            config.share_token_max_attempts = DEFAULT_MAX_ATTEMPTS;
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_policy(&self) -> Result<TokenPolicy, AppError> {
        TokenPolicy::new(
            &self.share_token_alphabet,
            self.share_token_length,
            self.share_token_max_attempts,
        )
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    pub fn auth_rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.auth_rate_limit_max_requests,
            window_duration: Duration::from_secs(self.auth_rate_limit_window_seconds),
        }
    }
}
