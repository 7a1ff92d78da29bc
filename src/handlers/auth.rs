use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::auth::AuthUser;
use crate::models::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Register a new account and start a session
pub async fn signup(
    State(app_state): State<AppState>,
    Json(request): Json<Credentials>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user = app_state.users.signup(&request.username, &request.password).await?;
    let token = app_state.session_manager.create_session(user.id).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "token": token
        })),
    ))
}

/// Exchange credentials for a bearer token
pub async fn login(
    State(app_state): State<AppState>,
    Json(request): Json<Credentials>,
) -> Result<Json<Value>, AppError> {
    let user = app_state.users.login(&request.username, &request.password).await?;
    let token = app_state.session_manager.create_session(user.id).await;

    Ok(Json(json!({ "token": token })))
}

/// End the caller's session
pub async fn logout(
    State(app_state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    app_state.session_manager.destroy_session(&auth.token).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}
