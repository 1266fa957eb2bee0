//! Valuation module - read-only portfolio and holding math.

mod valuation_model;
mod valuation_service;
mod valuation_traits;

// Re-export the public interface
pub use valuation_model::{
    build_holding, cost_basis, market_value, profit_loss, profit_loss_percentage, Holding,
    PortfolioDetail, PortfolioOverview,
};
pub use valuation_service::ValuationService;
pub use valuation_traits::ValuationServiceTrait;
