//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod user;

#[cfg(test)]
pub mod memory;

pub use user::{TelegramProfile, TelegramUserStore, UserRecord, UserRepository};

use thiserror::Error;

/// Repository error
///
/// Unique-constraint violations are surfaced separately: for the user table
/// they mean a concurrent insert won and the caller should update instead.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::UniqueViolation
            }
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            _ => RepositoryError::Database(err),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
