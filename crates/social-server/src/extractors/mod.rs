//! Request extractors

pub mod conn;
pub mod json;

pub use conn::Conn;
pub use json::ValidatedJson;
