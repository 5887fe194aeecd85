//! User handlers

use axum::{extract::State, http::StatusCode, Json};
use social_types::{NewUser, User};
use tracing::info;

use crate::error::ApiError;
use crate::extractors::{Conn, ValidatedJson};
use crate::AppState;

pub async fn list(Conn(mut store): Conn) -> Result<Json<Vec<User>>, ApiError> {
    let users = store.list_users().await?;
    Ok(Json(users))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    // Body is validated before a connection is checked out
    let mut store = state.db.acquire().await?;
    let user = store
        .insert_user(&req.username, Some(req.role_or_default()))
        .await?;

    info!("Created user {} ({})", user.username, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}
