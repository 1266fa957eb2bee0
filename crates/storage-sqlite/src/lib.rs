//! SQLite persistence for papertrade, built on Diesel.
//!
//! Everything Diesel lives here: the pooled connections, the embedded
//! migrations, the single-writer actor that serializes trade
//! transactions, and the repository implementations behind the traits
//! `papertrade-core` consumes. Core never sees a Diesel type; the
//! server wires the two crates together at startup.

pub mod db;
pub mod errors;
pub mod schema;

pub mod portfolios;
pub mod positions;
pub mod snapshots;
pub mod stocks;
pub mod transactions;
pub mod users;

pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, DbTransactionExecutor, WriteHandle,
};
pub use errors::{IntoCore, StorageError};

// Callers of this crate mostly want these alongside the repositories.
pub use papertrade_core::errors::{DatabaseError, Error, Result};
