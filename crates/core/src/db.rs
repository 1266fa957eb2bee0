//! Database abstractions shared between services and the storage layer.

use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::errors::{DatabaseError, Error, Result};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Carries a domain error across the Diesel transaction boundary without
/// collapsing it to a string. Diesel requires the transaction error type to
/// implement `From<diesel::result::Error>` so it can signal rollback.
pub enum TxError {
    Domain(Error),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(e: diesel::result::Error) -> Self {
        TxError::Diesel(e)
    }
}

impl TxError {
    pub fn into_error(self) -> Error {
        match self {
            TxError::Domain(e) => e,
            TxError::Diesel(e) => Error::Database(DatabaseError::TransactionFailed(e.to_string())),
        }
    }
}

/// Trait for executing database write transactions.
///
/// Services compose multi-entity units of work against this seam and stay
/// agnostic of how the transaction is scheduled. The storage layer provides
/// the production implementation (a serialized writer); tests and simple
/// callers can run units directly on a pool.
#[async_trait::async_trait]
pub trait DbTransactionExecutor: Send + Sync {
    /// Execute operations within a single write transaction and return
    /// the result. The closure's error rolls the transaction back and is
    /// returned unchanged.
    async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static;
}

/// Implementation of DbTransactionExecutor for DbPool
#[async_trait::async_trait]
impl DbTransactionExecutor for DbPool {
    async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut conn = self
            .get()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        conn.immediate_transaction::<_, TxError, _>(|tx_conn| f(tx_conn).map_err(TxError::Domain))
            .map_err(TxError::into_error)
    }
}

/// Implementation of DbTransactionExecutor for Arc<DbPool>
#[async_trait::async_trait]
impl DbTransactionExecutor for Arc<DbPool> {
    async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        (**self).execute(f).await
    }
}
