//! Per-request storage handle and the CRUD operations on it

use chrono::{DateTime, Utc};
use social_types::{Follow, Post, PostWithAuthor, User, DEFAULT_ROLE};
use sqlx::pool::PoolConnection;
use sqlx::Sqlite;

use super::error::{violated_constraint, Constraint, Result, StoreError};

const POST_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.title, p.body, p.user_id, p.status, p.created_at, u.username
    FROM posts p
    JOIN users u ON p.user_id = u.id
"#;

/// A pooled connection checked out for one unit of work.
///
/// Dropping the store returns the connection to the pool, whichever way the
/// caller exits.
pub struct Store {
    conn: PoolConnection<Sqlite>,
}

impl Store {
    pub(crate) fn new(conn: PoolConnection<Sqlite>) -> Self {
        Self { conn }
    }

    // User operations
    pub async fn list_users(&mut self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, role, created_at
            FROM users
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub async fn insert_user(&mut self, username: &str, role: Option<&str>) -> Result<User> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (username, role)
            VALUES (?1, ?2)
            RETURNING id, username, role, created_at
            "#,
        )
        .bind(username)
        .bind(role.unwrap_or(DEFAULT_ROLE))
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some(Constraint::Unique) => {
                StoreError::unique(format!("Username '{}' already exists", username))
            }
            _ => StoreError::Database(e),
        })?;

        tracing::debug!(id = row.id, username, "Created user");
        Ok(row.into())
    }

    pub async fn count_users(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    // Post operations
    pub async fn list_posts(&mut self) -> Result<Vec<PostWithAuthor>> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "{POST_WITH_AUTHOR} ORDER BY p.created_at DESC, p.id DESC"
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub async fn insert_post(
        &mut self,
        title: &str,
        body: &str,
        user_id: i64,
    ) -> Result<PostWithAuthor> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, body, user_id)
            VALUES (?1, ?2, ?3)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(user_id)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some(Constraint::ForeignKey) => {
                StoreError::foreign_key(format!("User {} does not exist", user_id))
            }
            _ => StoreError::Database(e),
        })?;

        let row: PostRow = sqlx::query_as(&format!("{POST_WITH_AUTHOR} WHERE p.id = ?1"))
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;

        tracing::debug!(id, user_id, "Created post");
        Ok(row.into())
    }

    pub async fn count_posts(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    // Follow operations
    pub async fn insert_follow(
        &mut self,
        following_user_id: i64,
        followed_user_id: i64,
    ) -> Result<Follow> {
        let result = sqlx::query_as::<_, FollowRow>(
            r#"
            INSERT INTO follows (following_user_id, followed_user_id)
            VALUES (?1, ?2)
            RETURNING following_user_id, followed_user_id, created_at
            "#,
        )
        .bind(following_user_id)
        .bind(followed_user_id)
        .fetch_one(&mut *self.conn)
        .await;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                return Err(match violated_constraint(&e) {
                    Some(Constraint::Unique) => StoreError::unique(format!(
                        "User {} already follows user {}",
                        following_user_id, followed_user_id
                    )),
                    Some(Constraint::ForeignKey) => {
                        let missing = self
                            .first_missing_user(&[following_user_id, followed_user_id])
                            .await?
                            .unwrap_or(following_user_id);
                        StoreError::foreign_key(format!("User {} does not exist", missing))
                    }
                    None => StoreError::Database(e),
                });
            }
        };

        tracing::debug!(following_user_id, followed_user_id, "Created follow");
        Ok(row.into())
    }

    async fn first_missing_user(&mut self, ids: &[i64]) -> Result<Option<i64>> {
        for &id in ids {
            let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *self.conn)
                .await?;
            if found.is_none() {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

// Helper structs for sqlx query_as
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            username: r.username,
            role: r.role,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    body: String,
    user_id: i64,
    status: String,
    created_at: DateTime<Utc>,
    username: String,
}

impl From<PostRow> for PostWithAuthor {
    fn from(r: PostRow) -> Self {
        PostWithAuthor {
            post: Post {
                id: r.id,
                title: r.title,
                body: r.body,
                user_id: r.user_id,
                status: r.status,
                created_at: r.created_at,
            },
            username: r.username,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FollowRow {
    following_user_id: i64,
    followed_user_id: i64,
    created_at: DateTime<Utc>,
}

impl From<FollowRow> for Follow {
    fn from(r: FollowRow) -> Self {
        Follow {
            following_user_id: r.following_user_id,
            followed_user_id: r.followed_user_id,
            created_at: r.created_at,
        }
    }
}
