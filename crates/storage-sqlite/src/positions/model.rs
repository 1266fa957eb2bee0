use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;

use papertrade_core::positions::Position;

/// Row in the `positions` table. A unique index keeps at most one row
/// per (portfolio, stock) pair.
#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDB {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub quantity: i64,
    pub average_buy_price: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<PositionDB> for Position {
    fn from(row: PositionDB) -> Self {
        Self {
            id: row.id,
            portfolio_id: row.portfolio_id,
            stock_id: row.stock_id,
            quantity: row.quantity,
            average_buy_price: Decimal::from_str(&row.average_buy_price).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
