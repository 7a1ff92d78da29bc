use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::models::collection::{CollectionChanges, CollectionDetail, CollectionSummary};
use crate::models::errors::AppError;
use crate::services::collection_service::NewCollection;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_private: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCollectionRequest {
    pub content_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub collection_ids: Vec<Uuid>,
}

pub async fn list_collections(
    State(app_state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let collections = app_state.collections.list(auth.user_id).await?;
    Ok(Json(json!({ "collections": collections })))
}

pub async fn create_collection(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<CollectionSummary>), AppError> {
    let collection = app_state
        .collections
        .create(
            auth.user_id,
            NewCollection {
                name: request.name,
                description: request.description,
                color: request.color,
                icon: request.icon,
                is_private: request.is_private,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn get_collection(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Path(collection_id): Path<Uuid>,
) -> Result<Json<CollectionDetail>, AppError> {
    Ok(Json(app_state.collections.get(auth.user_id, collection_id).await?))
}

pub async fn update_collection(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Path(collection_id): Path<Uuid>,
    Json(changes): Json<CollectionChanges>,
) -> Result<Json<CollectionSummary>, AppError> {
    let collection = app_state
        .collections
        .update(auth.user_id, collection_id, changes)
        .await?;
    Ok(Json(collection))
}

pub async fn delete_collection(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Path(collection_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    app_state.collections.delete(auth.user_id, collection_id).await?;
    Ok(Json(json!({ "message": "Collection deleted successfully" })))
}

/// Add one of the caller's saved links to a collection
pub async fn add_to_collection(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Path(collection_id): Path<Uuid>,
    Json(request): Json<AddToCollectionRequest>,
) -> Result<Json<Value>, AppError> {
    let content_count = app_state
        .collections
        .add_content(auth.user_id, collection_id, request.content_id)
        .await?;
    Ok(Json(json!({
        "message": "Content added to collection",
        "contentCount": content_count
    })))
}

pub async fn remove_from_collection(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Path((collection_id, content_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let content_count = app_state
        .collections
        .remove_content(auth.user_id, collection_id, content_id)
        .await?;
    Ok(Json(json!({
        "message": "Content removed from collection",
        "contentCount": content_count
    })))
}

pub async fn reorder_collections(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Value>, AppError> {
    app_state
        .collections
        .reorder(auth.user_id, &request.collection_ids)
        .await?;
    Ok(Json(json!({ "message": "Collections reordered successfully" })))
}
