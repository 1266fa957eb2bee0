use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;

use papertrade_core::constants::DECIMAL_PRECISION;
use papertrade_core::snapshots::{NewSnapshot, PortfolioSnapshot};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Row in the `portfolio_snapshots` table. `snapshot_date` is ISO-8601
/// TEXT, so lexicographic ordering is chronological.
#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::portfolio_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotDB {
    pub id: String,
    pub portfolio_id: String,
    pub snapshot_date: String,
    pub cash_balance: String,
    pub stock_value: String,
    pub total_value: String,
    pub created_at: NaiveDateTime,
}

impl From<SnapshotDB> for PortfolioSnapshot {
    fn from(row: SnapshotDB) -> Self {
        Self {
            id: row.id,
            portfolio_id: row.portfolio_id,
            snapshot_date: NaiveDate::parse_from_str(&row.snapshot_date, DATE_FORMAT)
                .unwrap_or_default(),
            cash_balance: Decimal::from_str(&row.cash_balance).unwrap_or_default(),
            stock_value: Decimal::from_str(&row.stock_value).unwrap_or_default(),
            total_value: Decimal::from_str(&row.total_value).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

impl From<NewSnapshot> for SnapshotDB {
    fn from(new_snapshot: NewSnapshot) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: new_snapshot.portfolio_id,
            snapshot_date: new_snapshot.snapshot_date.format(DATE_FORMAT).to_string(),
            cash_balance: new_snapshot
                .cash_balance
                .round_dp(DECIMAL_PRECISION)
                .to_string(),
            stock_value: new_snapshot
                .stock_value
                .round_dp(DECIMAL_PRECISION)
                .to_string(),
            total_value: new_snapshot
                .total_value
                .round_dp(DECIMAL_PRECISION)
                .to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
