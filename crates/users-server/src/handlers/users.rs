//! User handlers

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use users_core::{NewUser, User, UserChanges, UserId};

pub const DELETED_MESSAGE: &str = "User deleted successfully";

/// User as exposed over HTTP
///
/// Deliberately narrower than the stored [`User`]: the password is never
/// echoed back, on any route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.find_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(id) = id?;
    let user = state.users.find_one(id).await?;
    Ok(Json(user.into()))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(new_user) = body?;
    info!("Creating user: {}", new_user.email);

    let user = state.users.create(new_user).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    body: Result<Json<UserChanges>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(id) = id?;
    let Json(changes) = body?;

    let user = state.users.update(id, changes).await?;
    Ok(Json(user.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    state.users.remove(id).await?;

    Ok(Json(MessageResponse {
        message: DELETED_MESSAGE.to_string(),
    }))
}
