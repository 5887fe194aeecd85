//! Storage error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Which table constraint rejected a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Duplicate username or duplicate follow edge
    Unique,
    /// A referenced user does not exist
    ForeignKey,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{message}")]
    ConstraintViolation {
        constraint: Constraint,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn unique(message: impl Into<String>) -> Self {
        StoreError::ConstraintViolation {
            constraint: Constraint::Unique,
            message: message.into(),
        }
    }

    pub fn foreign_key(message: impl Into<String>) -> Self {
        StoreError::ConstraintViolation {
            constraint: Constraint::ForeignKey,
            message: message.into(),
        }
    }

    /// The violated constraint, if this is a constraint violation.
    pub fn constraint(&self) -> Option<Constraint> {
        match self {
            StoreError::ConstraintViolation { constraint, .. } => Some(*constraint),
            StoreError::Database(_) => None,
        }
    }
}

/// Classifies a sqlx error raised by SQLite's own constraint checks.
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<Constraint> {
    match err {
        sqlx::Error::Database(db_err) => match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => Some(Constraint::Unique),
            sqlx::error::ErrorKind::ForeignKeyViolation => Some(Constraint::ForeignKey),
            _ => None,
        },
        _ => None,
    }
}
