//! Trading domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::TradingError;
use crate::positions::Position;
use crate::transactions::TradeSide;
use crate::{Error, Result};

/// A market order as submitted by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrder {
    pub portfolio_id: String,
    pub symbol: String,
    pub quantity: i64,
}

impl TradeOrder {
    /// Validates the order.
    pub fn validate(&self) -> Result<()> {
        if self.quantity <= 0 {
            return Err(Error::Trading(TradingError::InvalidQuantity(self.quantity)));
        }
        Ok(())
    }
}

/// Result of an executed trade.
///
/// `position` is `None` when a sell liquidated the holding entirely.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOutcome {
    pub side: TradeSide,
    pub symbol: String,
    pub quantity: i64,
    pub price: Decimal,
    pub trade_total: Decimal,
    pub cash_balance: Decimal,
    pub position: Option<Position>,
    pub transaction_id: String,
}
