use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::models::content::ContentType;
use crate::models::errors::AppError;
use crate::services::content_service::NewContent;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddContentRequest {
    pub title: String,
    pub link: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Save a link for the caller
pub async fn add_content(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AddContentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let content = app_state
        .content
        .add(
            auth.user_id,
            NewContent {
                title: request.title,
                link: request.link,
                content_type: request.content_type,
                tags: request.tags,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Content added",
            "content": content
        })),
    ))
}

/// The caller's saved links, newest first
pub async fn list_content(
    State(app_state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let content = app_state.content.list(auth.user_id).await?;
    Ok(Json(json!({ "content": content })))
}

pub async fn delete_content(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Path(content_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    app_state.content.delete(auth.user_id, content_id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}
