//! Snapshot domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A portfolio's value on one calendar day. At most one row exists per
/// portfolio per date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub id: String,
    pub portfolio_id: String,
    pub snapshot_date: NaiveDate,
    pub cash_balance: Decimal,
    pub stock_value: Decimal,
    pub total_value: Decimal,
    pub created_at: NaiveDateTime,
}

/// Input model for recording a snapshot.
#[derive(Debug, Clone)]
pub struct NewSnapshot {
    pub portfolio_id: String,
    pub snapshot_date: NaiveDate,
    pub cash_balance: Decimal,
    pub stock_value: Decimal,
    pub total_value: Decimal,
}

/// Outcome of one batch snapshot run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotBatchReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}
