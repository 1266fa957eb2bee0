use crate::Result;

use super::{PortfolioDetail, PortfolioOverview};

/// Trait defining the contract for valuation services.
pub trait ValuationServiceTrait: Send + Sync {
    fn portfolio_overview(&self, user_id: &str, portfolio_id: &str) -> Result<PortfolioOverview>;
    fn portfolio_detail(&self, user_id: &str, portfolio_id: &str) -> Result<PortfolioDetail>;
    fn list_overviews(&self, user_id: &str) -> Result<Vec<PortfolioOverview>>;
}
