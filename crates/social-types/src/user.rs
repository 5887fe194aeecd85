//! User types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::not_blank;

/// Role assigned when a request does not name one.
pub const DEFAULT_ROLE: &str = "user";

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /users`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    #[validate(
        length(min = 1, max = 50),
        custom(function = "not_blank")
    )]
    pub username: String,
    #[validate(length(min = 1, max = 20))]
    pub role: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Role to persist, falling back to [`DEFAULT_ROLE`].
    pub fn role_or_default(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }
}
