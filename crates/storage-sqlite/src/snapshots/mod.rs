//! SQLite storage implementation for portfolio snapshots.

mod model;
mod repository;

pub use model::SnapshotDB;
pub use repository::SnapshotRepository;
