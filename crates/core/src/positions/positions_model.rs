//! Position domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An open holding of a single stock within a portfolio.
///
/// One row per (portfolio, stock) pair. Rows exist only while the held
/// quantity is positive; selling down to zero removes the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub quantity: i64,
    pub average_buy_price: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Position {
    /// Total acquisition cost of the holding at the blended price.
    pub fn cost_basis(&self) -> Decimal {
        Decimal::from(self.quantity) * self.average_buy_price
    }
}

/// Input model for opening a position.
#[derive(Debug, Clone)]
pub struct NewPosition {
    pub portfolio_id: String,
    pub stock_id: String,
    pub quantity: i64,
    pub average_buy_price: Decimal,
}
