//! Converts Diesel and r2d2 failures into the backend-neutral
//! `DatabaseError` values the core crate exposes.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use papertrade_core::errors::{DatabaseError, Error};

/// Failure raised inside the storage layer before it crosses into core.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("connection failed: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("pool exhausted: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("query failed: {0}")]
    Query(#[from] DieselError),

    #[error("migration failed: {0}")]
    Migration(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let db = match err {
            StorageError::Connection(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::Pool(e) => DatabaseError::PoolCreationFailed(e.to_string()),
            StorageError::Query(e) => query_error(e),
            StorageError::Migration(e) => DatabaseError::MigrationFailed(e),
        };
        Error::Database(db)
    }
}

/// Constraint failures keep the violated constraint in the message,
/// which callers inspect (duplicate usernames for one).
fn query_error(err: DieselError) -> DatabaseError {
    match err {
        DieselError::NotFound => DatabaseError::NotFound("record not found".to_string()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DatabaseError::UniqueViolation(info.message().to_string())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DatabaseError::ForeignKeyViolation(info.message().to_string())
        }
        other => DatabaseError::QueryFailed(other.to_string()),
    }
}

/// Adapter for the `Result` types Diesel and r2d2 produce, so query
/// code can end with `.into_core()?` instead of spelling the mapping
/// at every call site.
pub trait IntoCore<T> {
    fn into_core(self) -> papertrade_core::Result<T>;
}

impl<T, E> IntoCore<T> for std::result::Result<T, E>
where
    StorageError: From<E>,
{
    fn into_core(self) -> papertrade_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
