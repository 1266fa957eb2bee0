use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;

use papertrade_core::stocks::Stock;

/// Row in the `stocks` table. A placeholder row carries a zero
/// `last_price` until the first successful quote lands.
#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::stocks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockDB {
    pub id: String,
    pub symbol: String,
    pub company_name: String,
    pub last_price: String,
    pub last_updated: NaiveDateTime,
}

impl From<StockDB> for Stock {
    fn from(row: StockDB) -> Self {
        Self {
            id: row.id,
            symbol: row.symbol,
            company_name: row.company_name,
            last_price: Decimal::from_str(&row.last_price).unwrap_or_default(),
            last_updated: row.last_updated,
        }
    }
}
