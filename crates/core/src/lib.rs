//! Papertrade Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic for the papertrade virtual
//! trading service. It is database-agnostic where possible and defines
//! repository traits that are implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod db;
pub mod errors;
pub mod portfolios;
pub mod positions;
pub mod quotes;
pub mod snapshots;
pub mod stocks;
pub mod trading;
pub mod transactions;
pub mod users;
pub mod valuation;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
