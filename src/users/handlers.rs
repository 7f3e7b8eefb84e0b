//! User endpoint handlers

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::extractors::AuthedUser;
use crate::auth::models::UserInfo;
use crate::common::{ApiError, AppState};
use crate::services::users;

/// GET /api/user/profile
/// Returns the current authenticated user's information
pub async fn get_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<UserInfo>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = users::get_by_id(&state.db, &authed.id)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", authed.id)))?;

    Ok(Json(UserInfo::from(&user)))
}

/// GET /api/user/all
/// Returns every known user
pub async fn get_all_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
) -> Result<Json<Vec<UserInfo>>, ApiError> {
    let state = state_lock.read().await.clone();

    let users = users::get_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(users.iter().map(UserInfo::from).collect()))
}
