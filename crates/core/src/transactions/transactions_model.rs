//! Trade ledger domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error};

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(TradeSide::Buy),
            "SELL" => Ok(TradeSide::Sell),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Invalid trade side: {}",
                other
            )))),
        }
    }
}

/// A single executed trade. Ledger rows are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub side: TradeSide,
    pub quantity: i64,
    pub price: Decimal,
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    /// Cash moved by this trade, always positive.
    pub fn total_amount(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }
}

/// Input model for recording a trade.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub portfolio_id: String,
    pub stock_id: String,
    pub side: TradeSide,
    pub quantity: i64,
    pub price: Decimal,
}

/// Ledger row joined with its stock symbol, as presented in histories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    pub id: String,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: i64,
    pub price: Decimal,
    pub total_amount: Decimal,
    pub timestamp: NaiveDateTime,
}
