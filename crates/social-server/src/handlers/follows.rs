//! Follow handlers
//!
//! Follows are insert-only: there is no unfollow and no follower listing.

use axum::{extract::State, http::StatusCode, Json};
use social_types::{FollowCreated, NewFollow};

use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewFollow>,
) -> Result<(StatusCode, Json<FollowCreated>), ApiError> {
    let mut store = state.db.acquire().await?;
    let follow = store
        .insert_follow(req.following_user_id, req.followed_user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(follow.into())))
}
