//! Social Types - Pure type definitions shared by the API and its clients
//!
//! Entities as they are persisted and returned over HTTP, plus the request
//! bodies accepted by the API. No runtime or database dependencies.

pub mod follow;
pub mod post;
pub mod response;
pub mod user;

pub use follow::*;
pub use post::*;
pub use response::*;
pub use user::*;

use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
