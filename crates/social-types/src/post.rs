//! Post types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::not_blank;

/// Status given to every new post.
pub const DEFAULT_STATUS: &str = "published";

/// A post as stored in the `posts` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub user_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A post together with its author's username, as listed by `GET /posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub username: String,
}

/// Body of `POST /posts`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewPost {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    pub user_id: i64,
}

impl NewPost {
    pub fn new(title: impl Into<String>, body: impl Into<String>, user_id: i64) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_id,
        }
    }
}
