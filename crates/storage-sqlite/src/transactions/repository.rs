use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::transactions::dsl::*;
use crate::schema::{stocks, transactions};

use super::model::TransactionDB;
use papertrade_core::constants::DECIMAL_PRECISION;
use papertrade_core::transactions::{
    NewTransaction, Transaction, TransactionEntry, TransactionRepositoryTrait,
};
use papertrade_core::Result;

/// Repository for the append-only trade ledger
pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl TransactionRepositoryTrait for TransactionRepository {
    /// Trade history for a portfolio joined with stock symbols, newest
    /// first
    fn list_by_portfolio(
        &self,
        portfolio_id_param: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionEntry>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = transactions
            .inner_join(stocks::table)
            .filter(portfolio_id.eq(portfolio_id_param))
            .select((TransactionDB::as_select(), stocks::symbol))
            .order(timestamp.desc())
            .limit(limit)
            .offset(offset)
            .load::<(TransactionDB, String)>(&mut conn)
            .into_core()?;

        Ok(rows
            .into_iter()
            .map(|(row, symbol_value)| {
                let transaction: Transaction = row.into();
                let total_amount = transaction.total_amount();
                TransactionEntry {
                    id: transaction.id,
                    symbol: symbol_value,
                    side: transaction.side,
                    quantity: transaction.quantity,
                    price: transaction.price,
                    total_amount,
                    timestamp: transaction.timestamp,
                }
            })
            .collect())
    }

    fn insert_in_transaction(
        &self,
        new_transaction: NewTransaction,
        conn: &mut SqliteConnection,
    ) -> Result<Transaction> {
        let transaction_db = TransactionDB {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: new_transaction.portfolio_id,
            stock_id: new_transaction.stock_id,
            side: new_transaction.side.as_str().to_string(),
            quantity: new_transaction.quantity,
            price: new_transaction.price.round_dp(DECIMAL_PRECISION).to_string(),
            timestamp: chrono::Utc::now().naive_utc(),
        };

        diesel::insert_into(transactions::table)
            .values(&transaction_db)
            .execute(conn)
            .into_core()?;

        Ok(transaction_db.into())
    }
}
