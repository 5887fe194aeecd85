//! Per-request database connection

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::storage::Store;
use crate::AppState;

/// Storage handle scoped to a single request.
///
/// The connection goes back to the pool when the handler drops it, on
/// success and on every error path. Only for handlers without a request
/// body: handlers that read one acquire after it has been validated, so a
/// slow upload never pins a pooled connection.
pub struct Conn(pub Store);

#[async_trait]
impl FromRequestParts<AppState> for Conn {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let store = state.db.acquire().await?;
        Ok(Conn(store))
    }
}
