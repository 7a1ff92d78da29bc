use axum::{extract::State, response::Json};

use crate::middleware::auth::AuthUser;
use crate::models::errors::AppError;
use crate::models::user::Profile;
use crate::AppState;

pub async fn get_profile(
    State(app_state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(app_state.users.profile(auth.user_id).await?))
}
