//! Admin user management.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;

use evergreen_core::UserId;

use crate::db::RepositoryError;
use crate::db::users::{UserPatch, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::routes::views::UserOut;
use crate::services::auth::hash_password;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", patch(update_user))
}

#[derive(Debug, Deserialize)]
struct UsersQuery {
    role: Option<String>,
}

async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<Vec<UserOut>>> {
    let users = UserRepository::new(state.pool())
        .list(query.role.as_deref())
        .await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
struct UserUpdateRequest {
    username: Option<String>,
    password: Option<String>,
    phone: Option<String>,
}

async fn update_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UserUpdateRequest>,
) -> Result<Json<UserOut>> {
    let username = body
        .username
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty());
    let password_hash = body.password.as_deref().map(hash_password).transpose()?;

    let user = UserRepository::new(state.pool())
        .update(
            UserId::new(id),
            UserPatch {
                username,
                password_hash,
                phone: body.phone,
            },
        )
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User".to_owned()),
            other => AppError::Repository(other),
        })?;

    Ok(Json(user.into()))
}
