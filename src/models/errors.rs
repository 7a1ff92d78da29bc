use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::store::{StoreError, UniqueKey};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Authentication failed: {message}")]
    Unauthorized { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Share link not found")]
    ShareLinkNotFound,

    #[error("Share link owner {owner_id} no longer exists")]
    ShareOwnerMissing { owner_id: String },

    #[error("No unused share token found after {attempts} attempts")]
    TokenSpaceExhausted { attempts: usize },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimitError { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error_code: String,
    pub severity: ErrorSeverity,
    pub actions: Vec<ErrorAction>,
    pub retry_after: Option<u64>, // seconds
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorAction {
    pub action_type: ErrorActionType,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ErrorActionType {
    Retry,
    EditInput,
    SignIn,
    ContactSupport,
}

fn action(action_type: ErrorActionType, label: &str, description: &str) -> ErrorAction {
    ErrorAction {
        action_type,
        label: label.to_string(),
        description: description.to_string(),
    }
}

pub struct ErrorHandler;

impl ErrorHandler {
    /// Converts an AppError into a user-friendly ErrorResponse
    pub fn handle_error(error: &AppError) -> ErrorResponse {
        match error {
            AppError::ValidationError { message } => ErrorResponse {
                message: "Invalid input".to_string(),
                error_code: "VALIDATION_FAILED".to_string(),
                severity: ErrorSeverity::Low,
                actions: vec![action(
                    ErrorActionType::EditInput,
                    "Fix Input",
                    "Please correct the input and try again",
                )],
                retry_after: None,
                details: Some(message.clone()),
            },

            AppError::Unauthorized { message } => ErrorResponse {
                message: message.clone(),
                error_code: "UNAUTHORIZED".to_string(),
                severity: ErrorSeverity::Medium,
                actions: vec![action(
                    ErrorActionType::SignIn,
                    "Sign In",
                    "Log in again to obtain a new session",
                )],
                retry_after: None,
                details: None,
            },

            AppError::Conflict { message } => ErrorResponse {
                message: message.clone(),
                error_code: "CONFLICT".to_string(),
                severity: ErrorSeverity::Low,
                actions: vec![action(
                    ErrorActionType::EditInput,
                    "Change Input",
                    "Choose a different value",
                )],
                retry_after: None,
                details: None,
            },

            AppError::NotFound { message } => ErrorResponse {
                message: message.clone(),
                error_code: "NOT_FOUND".to_string(),
                severity: ErrorSeverity::Low,
                actions: vec![],
                retry_after: None,
                details: None,
            },

            AppError::Forbidden { message } => ErrorResponse {
                message: message.clone(),
                error_code: "FORBIDDEN".to_string(),
                severity: ErrorSeverity::Low,
                actions: vec![],
                retry_after: None,
                details: None,
            },

            // Unknown and revoked tokens are reported identically.
            AppError::ShareLinkNotFound => ErrorResponse {
                message: "Share link is invalid or expired".to_string(),
                error_code: "SHARE_LINK_NOT_FOUND".to_string(),
                severity: ErrorSeverity::Low,
                actions: vec![],
                retry_after: None,
                details: None,
            },

            AppError::ShareOwnerMissing { .. } => ErrorResponse {
                message: "The owner of this share link no longer exists".to_string(),
                error_code: "SHARE_OWNER_MISSING".to_string(),
                severity: ErrorSeverity::Low,
                actions: vec![],
                retry_after: None,
                details: None,
            },

            AppError::TokenSpaceExhausted { .. } => ErrorResponse {
                message: "Could not create a share link".to_string(),
                error_code: "SHARE_TOKEN_EXHAUSTED".to_string(),
                severity: ErrorSeverity::High,
                actions: vec![
                    action(ErrorActionType::Retry, "Try Again", "Retry enabling sharing"),
                    action(
                        ErrorActionType::ContactSupport,
                        "Report Issue",
                        "Report this issue if it continues",
                    ),
                ],
                retry_after: Some(1),
                details: None,
            },

            AppError::StorageError { .. } => ErrorResponse {
                message: "Storage operation failed".to_string(),
                error_code: "STORAGE_FAILED".to_string(),
                severity: ErrorSeverity::High,
                actions: vec![
                    action(ErrorActionType::Retry, "Try Again", "Retry the operation"),
                    action(
                        ErrorActionType::ContactSupport,
                        "Contact Support",
                        "If the problem persists, please contact support",
                    ),
                ],
                retry_after: Some(5),
                details: None,
            },

            AppError::RateLimitError { message } => ErrorResponse {
                message: "Too many requests".to_string(),
                error_code: "RATE_LIMITED".to_string(),
                severity: ErrorSeverity::Medium,
                actions: vec![action(
                    ErrorActionType::Retry,
                    "Wait and Retry",
                    "Please wait a moment before trying again",
                )],
                retry_after: Some(60),
                details: Some(message.clone()),
            },

            AppError::InternalError { .. } => ErrorResponse {
                message: "An internal server error occurred".to_string(),
                error_code: "INTERNAL_ERROR".to_string(),
                severity: ErrorSeverity::High,
                actions: vec![action(
                    ErrorActionType::Retry,
                    "Try Again",
                    "The error might be temporary",
                )],
                retry_after: Some(5),
                details: None,
            },
        }
    }

    /// HTTP status for an error
    pub fn status_code(error: &AppError) -> StatusCode {
        match error {
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. }
            | AppError::ShareLinkNotFound
            | AppError::ShareOwnerMissing { .. } => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::RateLimitError { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::StorageError { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TokenSpaceExhausted { .. } | AppError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = ErrorHandler::status_code(&self);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = ErrorHandler::handle_error(&self);
        let retry_after = body.retry_after;
        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after.filter(|_| status == StatusCode::TOO_MANY_REQUESTS) {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(UniqueKey::Username) => {
                AppError::conflict("A user with this email already exists")
            }
            StoreError::Conflict(key) => AppError::conflict(format!("Duplicate {}", key)),
            StoreError::Unavailable { message } => AppError::storage_failed(message),
        }
    }
}

// Convenience functions for creating specific errors
impl AppError {
    pub fn validation_failed(message: impl Into<String>) -> Self {
        AppError::ValidationError { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden { message: message.into() }
    }

    pub fn storage_failed(message: impl Into<String>) -> Self {
        AppError::StorageError { message: message.into() }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        AppError::RateLimitError { message: message.into() }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        AppError::InternalError { message: message.into() }
    }
}
