//! Follow types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Directed edge: `following_user_id` follows `followed_user_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub following_user_id: i64,
    pub followed_user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /follow`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewFollow {
    pub following_user_id: i64,
    pub followed_user_id: i64,
}

impl NewFollow {
    pub fn new(following_user_id: i64, followed_user_id: i64) -> Self {
        Self {
            following_user_id,
            followed_user_id,
        }
    }
}
