//! Transactions module - the immutable trade ledger.

mod transactions_model;
mod transactions_traits;

// Re-export the public interface
pub use transactions_model::{NewTransaction, TradeSide, Transaction, TransactionEntry};
pub use transactions_traits::TransactionRepositoryTrait;
