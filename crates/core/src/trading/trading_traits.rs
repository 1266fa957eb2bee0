use async_trait::async_trait;

use crate::Result;

use super::{TradeOrder, TradeOutcome};

/// Trait defining the contract for trade execution.
#[async_trait]
pub trait TradingServiceTrait: Send + Sync {
    /// Buys shares into the order's portfolio at the resolved price.
    async fn execute_buy(&self, user_id: &str, order: TradeOrder) -> Result<TradeOutcome>;

    /// Sells shares out of the order's portfolio at the resolved price.
    async fn execute_sell(&self, user_id: &str, order: TradeOrder) -> Result<TradeOutcome>;
}
