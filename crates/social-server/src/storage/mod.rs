//! Storage layer
//!
//! Embedded SQLite through a sqlx pool. Handlers never hold the pool
//! directly: each request checks out a [`Store`] and gives the connection
//! back when it is dropped.

pub mod db;
pub mod error;
pub mod store;

pub use db::Database;
pub use error::{Constraint, StoreError};
pub use store::Store;
