use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::models::errors::AppError;
use crate::AppState;

pub async fn follow(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    app_state.follows.follow(auth.user_id, user_id).await?;
    Ok(Json(json!({
        "message": "Successfully followed user",
        "userId": user_id
    })))
}

pub async fn unfollow(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    app_state.follows.unfollow(auth.user_id, user_id).await?;
    Ok(Json(json!({
        "message": "Successfully unfollowed user",
        "userId": user_id
    })))
}

pub async fn followers(
    State(app_state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let followers = app_state.follows.followers(user_id).await?;
    Ok(Json(json!({
        "count": followers.len(),
        "followers": followers
    })))
}

pub async fn following(
    State(app_state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let following = app_state.follows.following(user_id).await?;
    Ok(Json(json!({
        "count": following.len(),
        "following": following
    })))
}

/// Whether the caller follows `user_id`
pub async fn is_following(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let is_following = app_state.follows.is_following(auth.user_id, user_id).await?;
    Ok(Json(json!({ "isFollowing": is_following })))
}
