//! Trading module - order validation and trade execution.

mod trading_model;
mod trading_service;
mod trading_traits;

// Re-export the public interface
pub use trading_model::{TradeOrder, TradeOutcome};
pub use trading_service::TradingService;
pub use trading_traits::TradingServiceTrait;
