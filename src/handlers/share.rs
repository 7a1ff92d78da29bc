use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::auth::AuthUser;
use crate::models::errors::AppError;
use crate::models::share_link::SharedContent;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub share: bool,
}

/// Enable or disable the caller's public share link
pub async fn toggle_share(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ShareRequest>,
) -> Result<Json<Value>, AppError> {
    if request.share {
        let token = app_state.shares.issue(auth.user_id).await?;
        Ok(Json(json!({ "hash": token })))
    } else {
        app_state.shares.revoke(auth.user_id).await?;
        Ok(Json(json!({ "message": "Removed link" })))
    }
}

/// Public, read-only view of a shared collection
pub async fn view_shared(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SharedContent>, AppError> {
    Ok(Json(app_state.shares.resolve(&token).await?))
}
