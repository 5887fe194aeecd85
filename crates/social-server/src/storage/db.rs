//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

use super::Store;

/// Millisecond timestamps keep `ORDER BY created_at` meaningful for rows
/// written within the same second.
const NOW: &str = "(strftime('%Y-%m-%d %H:%M:%f', 'now'))";

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file at `database_path` and bring the
    /// schema up to date.
    pub async fn open(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` sees its own empty database, so
    /// the pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        tracing::info!("SQLite connection established, running migrations...");
        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database initialization complete");

        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                role VARCHAR(20) NOT NULL DEFAULT 'user',
                created_at DATETIME NOT NULL DEFAULT {NOW}
            )
            "#
        ))
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(100) NOT NULL,
                body TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'published',
                created_at DATETIME NOT NULL DEFAULT {NOW},
                FOREIGN KEY (user_id) REFERENCES users(id)
            )
            "#
        ))
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS follows (
                following_user_id INTEGER NOT NULL,
                followed_user_id INTEGER NOT NULL,
                created_at DATETIME NOT NULL DEFAULT {NOW},
                PRIMARY KEY (following_user_id, followed_user_id),
                FOREIGN KEY (following_user_id) REFERENCES users(id),
                FOREIGN KEY (followed_user_id) REFERENCES users(id)
            )
            "#
        ))
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Check out a connection for the duration of one request.
    pub async fn acquire(&self) -> std::result::Result<Store, sqlx::Error> {
        let conn = self.pool.acquire().await?;
        Ok(Store::new(conn))
    }

    /// Insert the demo users, posts and follows into an empty database.
    ///
    /// Returns `false` without touching anything when users already exist.
    pub async fn seed_sample_data(&self) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        if users > 0 {
            return Ok(false);
        }

        let mut ids = Vec::with_capacity(SAMPLE_USERS.len());
        for (username, role) in SAMPLE_USERS {
            let id: i64 =
                sqlx::query_scalar("INSERT INTO users (username, role) VALUES (?1, ?2) RETURNING id")
                    .bind(username)
                    .bind(role)
                    .fetch_one(&mut *tx)
                    .await?;
            ids.push(id);
        }

        for (title, body, author) in SAMPLE_POSTS {
            sqlx::query("INSERT INTO posts (title, body, user_id) VALUES (?1, ?2, ?3)")
                .bind(title)
                .bind(body)
                .bind(ids[author])
                .execute(&mut *tx)
                .await?;
        }

        for (following, followed) in SAMPLE_FOLLOWS {
            sqlx::query(
                "INSERT INTO follows (following_user_id, followed_user_id) VALUES (?1, ?2)",
            )
            .bind(ids[following])
            .bind(ids[followed])
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(
            users = SAMPLE_USERS.len(),
            posts = SAMPLE_POSTS.len(),
            follows = SAMPLE_FOLLOWS.len(),
            "Seeded sample data"
        );

        Ok(true)
    }
}

const SAMPLE_USERS: [(&str, &str); 3] = [
    ("juan_dev", "user"),
    ("maria_admin", "admin"),
    ("carlos_student", "user"),
];

// (title, body, index into SAMPLE_USERS)
const SAMPLE_POSTS: [(&str, &str, usize); 3] = [
    ("Mi primer post", "Hola mundo desde la API con SQLite!", 0),
    ("Segundo post", "Este proyecto está genial", 1),
    ("Aprendiendo Rust", "Es más fácil de lo que pensé", 2),
];

const SAMPLE_FOLLOWS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];
