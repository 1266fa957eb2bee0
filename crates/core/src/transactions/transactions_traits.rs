use diesel::SqliteConnection;

use crate::Result;

use super::{NewTransaction, Transaction, TransactionEntry};

/// Trait for trade ledger repository operations.
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Trade history for a portfolio, newest first.
    fn list_by_portfolio(
        &self,
        portfolio_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionEntry>>;

    /// Appends a ledger row inside an open trade transaction.
    fn insert_in_transaction(
        &self,
        new_transaction: NewTransaction,
        conn: &mut SqliteConnection,
    ) -> Result<Transaction>;
}
