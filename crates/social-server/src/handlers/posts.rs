//! Post handlers

use axum::{extract::State, http::StatusCode, Json};
use social_types::{NewPost, PostWithAuthor};
use tracing::info;

use crate::error::ApiError;
use crate::extractors::{Conn, ValidatedJson};
use crate::AppState;

pub async fn list(Conn(mut store): Conn) -> Result<Json<Vec<PostWithAuthor>>, ApiError> {
    let posts = store.list_posts().await?;
    Ok(Json(posts))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewPost>,
) -> Result<(StatusCode, Json<PostWithAuthor>), ApiError> {
    let mut store = state.db.acquire().await?;
    let post = store
        .insert_post(&req.title, &req.body, req.user_id)
        .await?;

    info!("User {} published post {}", post.username, post.post.id);
    Ok((StatusCode::CREATED, Json(post)))
}
