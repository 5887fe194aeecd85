//! Health check

use axum::Json;
use social_types::HealthStatus;

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}
