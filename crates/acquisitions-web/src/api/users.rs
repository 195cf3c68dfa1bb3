use acquisitions_core::{parse_user_id, password, UpdateUserRequest, UserChanges};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use super::auth_handlers::json_body;
use crate::auth::middleware::{AdminUser, AuthUser};
use crate::dto::{UserRecord, UserResponse, UsersResponse};
use crate::error::AppError;
use crate::state::AppState;

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// GET /api/users (admin)
pub async fn list_users(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
) -> Result<Json<UsersResponse>, AppError> {
    let users: Vec<UserRecord> = state
        .store
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    tracing::info!("Admin {} retrieved {} users", admin.email, users.len());

    Ok(Json(UsersResponse {
        message: "Successfully retrieved users",
        count: users.len(),
        users,
    }))
}

/// GET /api/users/{id} (self or admin)
pub async fn get_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    user.allow_self_or_admin(&raw_id)?;
    let id = parse_user_id(&raw_id)?;

    let found = state.store.find_by_id(id).await?.ok_or_else(user_not_found)?;

    Ok(Json(UserResponse {
        message: "User retrieved successfully",
        user: found.into(),
    }))
}

/// PUT /api/users/{id} (self or admin)
pub async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    user.allow_self_or_admin(&raw_id)?;
    let id = parse_user_id(&raw_id)?;
    let update = json_body(body)?.validate()?;

    if update.role.is_some() && !user.role.is_admin() {
        tracing::warn!("User {} attempted to change a role", user.id);
        return Err(AppError::Forbidden(
            "Only admin users can change user roles".to_string(),
        ));
    }

    let password_hash = match update.password {
        Some(password) => Some(
            tokio::task::spawn_blocking(move || password::hash_password(&password)).await??,
        ),
        None => None,
    };

    let changes = UserChanges {
        name: update.name,
        email: update.email,
        password_hash,
        role: update.role,
    };

    let updated = state
        .store
        .update(id, changes)
        .await?
        .ok_or_else(user_not_found)?;

    tracing::info!("User {} updated by {}", updated.id, user.id);

    Ok(Json(UserResponse {
        message: "User updated successfully",
        user: updated.into(),
    }))
}

/// DELETE /api/users/{id} (admin)
pub async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let id = parse_user_id(&raw_id)?;

    let deleted = state.store.delete(id).await?.ok_or_else(user_not_found)?;

    tracing::info!("User {} deleted by admin {}", deleted.id, admin.id);

    Ok(Json(UserResponse {
        message: "User deleted successfully",
        user: deleted.into(),
    }))
}
