//! Social Network API Server
//!
//! REST API over users, posts and follows, backed by embedded SQLite.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod storage;

use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use storage::Database;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }
}

/// Build the HTTP router. Unmatched paths fall back to files under
/// `static_dir` when one is given.
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::health))
        .route(
            "/users",
            get(handlers::users::list).post(handlers::users::create),
        )
        .route(
            "/posts",
            get(handlers::posts::list).post(handlers::posts::create),
        )
        .route("/follow", post(handlers::follows::create));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let db = Database::in_memory().await.unwrap();
        router(AppState::new(db), None)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Social Network API is running!");
    }

    #[tokio::test]
    async fn test_user_and_post_flow() {
        let app = app().await;

        let (status, alice) =
            send(&app, Method::POST, "/users", Some(json!({"username": "alice"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(alice["username"], "alice");
        assert_eq!(alice["role"], "user");
        let alice_id = alice["id"].as_i64().unwrap();

        let (status, users) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(users
            .as_array()
            .unwrap()
            .iter()
            .any(|u| u["username"] == "alice"));

        let (status, post) = send(
            &app,
            Method::POST,
            "/posts",
            Some(json!({"title": "t", "body": "b", "user_id": alice_id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(post["username"], "alice");
        assert_eq!(post["status"], "published");

        let (status, posts) = send(&app, Method::GET, "/posts", None).await;
        assert_eq!(status, StatusCode::OK);
        let posts = posts.as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["title"], "t");
        assert_eq!(posts[0]["user_id"], alice_id);
        assert_eq!(posts[0]["username"], "alice");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let app = app().await;

        let body = json!({"username": "alice", "role": "admin"});
        let (status, _) = send(&app, Method::POST, "/users", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, error) = send(&app, Method::POST, "/users", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["code"], "conflict");
        assert_eq!(error["detail"], "Username 'alice' already exists");

        let (_, users) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(users.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_user_bodies_are_rejected() {
        let app = app().await;

        for body in [
            json!({}),
            json!({"username": ""}),
            json!({"username": "a".repeat(51)}),
            json!({"username": "alice", "is_admin": true}),
            json!({"username": 5}),
        ] {
            let (status, error) = send(&app, Method::POST, "/users", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error["code"], "validation_error");
        }

        let (_, users) = send(&app, Method::GET, "/users", None).await;
        assert!(users.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_for_unknown_user() {
        let app = app().await;

        let (status, error) = send(
            &app,
            Method::POST,
            "/posts",
            Some(json!({"title": "t", "body": "b", "user_id": 404})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["detail"], "User 404 does not exist");

        let (status, _) = send(
            &app,
            Method::POST,
            "/posts",
            Some(json!({"title": "t", "user_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, posts) = send(&app, Method::GET, "/posts", None).await;
        assert!(posts.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_follow() {
        let app = app().await;

        let (_, a) = send(&app, Method::POST, "/users", Some(json!({"username": "a"}))).await;
        let (_, b) = send(&app, Method::POST, "/users", Some(json!({"username": "b"}))).await;
        let edge = json!({"following_user_id": a["id"], "followed_user_id": b["id"]});

        let (status, created) = send(&app, Method::POST, "/follow", Some(edge.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["follow"]["following_user_id"], a["id"]);
        assert_eq!(created["follow"]["followed_user_id"], b["id"]);
        assert!(created["message"].as_str().unwrap().contains("now following"));

        let (status, error) = send(&app, Method::POST, "/follow", Some(edge)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["code"], "conflict");

        let (status, _) = send(
            &app,
            Method::POST,
            "/follow",
            Some(json!({"following_user_id": a["id"], "followed_user_id": 999})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_follow_and_post_bodies_are_rejected() {
        let app = app().await;

        for (uri, body) in [
            ("/follow", json!({"following_user_id": 1})),
            (
                "/follow",
                json!({"following_user_id": 1, "followed_user_id": 2, "mutual": true}),
            ),
            (
                "/posts",
                json!({"title": "t", "body": "b", "user_id": 1, "status": "draft"}),
            ),
        ] {
            let (status, error) = send(&app, Method::POST, uri, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(error["code"], "validation_error");
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let app = app().await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/users")
            .body(Body::from(r#"{"username":"alice"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (_, users) = send(&app, Method::GET, "/users", None).await;
        assert!(users.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stalled_uploads_do_not_hold_connections() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("social_network.db");
        let db = Database::open(&path.to_string_lossy()).await?;
        let app = router(AppState::new(db), None);

        // As many never-ending uploads as the pool has connections
        let mut uploads = Vec::new();
        for _ in 0..5 {
            let body = Body::from_stream(futures::stream::pending::<
                Result<axum::body::Bytes, std::io::Error>,
            >());
            let request = Request::builder()
                .method(Method::POST)
                .uri("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)?;
            uploads.push(tokio::spawn(app.clone().oneshot(request)));
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let (status, users) = tokio::time::timeout(
            std::time::Duration::from_secs(3),
            send(&app, Method::GET, "/users", None),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert!(users.as_array().unwrap().is_empty());

        for upload in uploads {
            upload.abort();
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_static_fallback() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        std::fs::write(temp_dir.path().join("index.html"), "<h1>feed</h1>")?;

        let db = Database::in_memory().await?;
        let app = router(AppState::new(db), Some(temp_dir.path().to_path_buf()));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/index.html").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&bytes[..], b"<h1>feed</h1>");

        // API routes still win over the fallback
        let (status, _) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(status, StatusCode::OK);

        Ok(())
    }
}
