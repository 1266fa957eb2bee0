use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;

use papertrade_core::transactions::{TradeSide, Transaction};

/// Row in the `transactions` ledger. `side` is constrained to BUY or
/// SELL by a CHECK constraint on the table.
#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub side: String,
    pub quantity: i64,
    pub price: String,
    pub timestamp: NaiveDateTime,
}

impl From<TransactionDB> for Transaction {
    fn from(row: TransactionDB) -> Self {
        Self {
            id: row.id,
            portfolio_id: row.portfolio_id,
            stock_id: row.stock_id,
            // The CHECK constraint makes anything else unreachable.
            side: TradeSide::from_str(&row.side).unwrap_or(TradeSide::Buy),
            quantity: row.quantity,
            price: Decimal::from_str(&row.price).unwrap_or_default(),
            timestamp: row.timestamp,
        }
    }
}
