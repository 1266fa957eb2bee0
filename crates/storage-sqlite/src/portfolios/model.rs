use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;

use papertrade_core::portfolios::Portfolio;

/// Row in the `portfolios` table. `cash_balance` is TEXT so the exact
/// decimal survives SQLite.
#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub cash_balance: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<PortfolioDB> for Portfolio {
    fn from(row: PortfolioDB) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            cash_balance: Decimal::from_str(&row.cash_balance).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
