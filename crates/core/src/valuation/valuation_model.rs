//! Valuation models and the pure math behind them.
//!
//! Everything here works off already loaded rows. Valuation never talks
//! to the quote provider; stale prices value at their cached level.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::positions::Position;
use crate::stocks::Stock;

/// Market value of a holding at the given price.
pub fn market_value(quantity: i64, price: Decimal) -> Decimal {
    Decimal::from(quantity) * price
}

/// Acquisition cost of a holding at its blended buy price.
pub fn cost_basis(quantity: i64, average_buy_price: Decimal) -> Decimal {
    Decimal::from(quantity) * average_buy_price
}

/// Unrealized gain or loss of a holding.
pub fn profit_loss(quantity: i64, price: Decimal, average_buy_price: Decimal) -> Decimal {
    Decimal::from(quantity) * (price - average_buy_price)
}

/// Gain or loss as a percentage of cost, 0 for a zero cost basis.
pub fn profit_loss_percentage(profit: Decimal, cost: Decimal) -> Decimal {
    if cost.is_zero() {
        return Decimal::ZERO;
    }
    (profit / cost * Decimal::ONE_HUNDRED).round_dp(DISPLAY_DECIMAL_PRECISION)
}

/// A valued position, joined with its stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub position_id: String,
    pub stock_id: String,
    pub symbol: String,
    pub company_name: String,
    pub quantity: i64,
    pub average_buy_price: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percentage: Decimal,
}

/// Values one position against its stock's cached price.
pub fn build_holding(position: &Position, stock: &Stock) -> Holding {
    let current_value = market_value(position.quantity, stock.last_price);
    let cost = cost_basis(position.quantity, position.average_buy_price);
    let profit = current_value - cost;
    Holding {
        position_id: position.id.clone(),
        stock_id: stock.id.clone(),
        symbol: stock.symbol.clone(),
        company_name: stock.company_name.clone(),
        quantity: position.quantity,
        average_buy_price: position.average_buy_price,
        current_price: stock.last_price,
        current_value,
        profit_loss: profit,
        profit_loss_percentage: profit_loss_percentage(profit, cost),
    }
}

/// Summary view of a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOverview {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub cash_balance: Decimal,
    pub stock_value: Decimal,
    pub total_value: Decimal,
    pub positions_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Full portfolio view including every valued holding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDetail {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub cash_balance: Decimal,
    pub stock_value: Decimal,
    pub total_value: Decimal,
    pub holdings: Vec<Holding>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
