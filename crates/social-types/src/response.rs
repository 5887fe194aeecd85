//! Response bodies that are not entities

use serde::{Deserialize, Serialize};

use crate::Follow;

/// Returned by `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub message: String,
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            message: "Social Network API is running!".to_string(),
            status: "ok".to_string(),
        }
    }
}

/// Confirmation returned by `POST /follow`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowCreated {
    pub message: String,
    pub follow: Follow,
}

impl From<Follow> for FollowCreated {
    fn from(follow: Follow) -> Self {
        Self {
            message: format!(
                "User {} is now following user {}",
                follow.following_user_id, follow.followed_user_id
            ),
            follow,
        }
    }
}

/// JSON body of every error response.
///
/// `detail` carries the human readable message the frontend displays;
/// `code` is stable and meant for programmatic checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    pub code: String,
}
