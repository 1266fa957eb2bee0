use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::TradingError;
use crate::{Error, Result};

use super::{NewPortfolio, Portfolio, PortfolioRepositoryTrait, PortfolioServiceTrait, PortfolioUpdate};

/// Service for managing portfolios.
pub struct PortfolioService {
    repository: Arc<dyn PortfolioRepositoryTrait>,
    default_starting_cash: Decimal,
}

impl PortfolioService {
    pub fn new(
        repository: Arc<dyn PortfolioRepositoryTrait>,
        default_starting_cash: Decimal,
    ) -> Self {
        Self {
            repository,
            default_starting_cash,
        }
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn create_portfolio(
        &self,
        user_id: &str,
        new_portfolio: NewPortfolio,
    ) -> Result<Portfolio> {
        new_portfolio.validate()?;
        let cash = new_portfolio
            .starting_cash
            .unwrap_or(self.default_starting_cash);
        self.repository.create(user_id, new_portfolio, cash).await
    }

    fn get_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio> {
        self.repository
            .get_by_id(user_id, portfolio_id)
            .map_err(|e| not_found_to_trading(e, portfolio_id))
    }

    fn list_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        self.repository.list_by_user(user_id)
    }

    async fn update_portfolio(
        &self,
        user_id: &str,
        portfolio_id: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio> {
        update.validate()?;
        self.repository
            .update(user_id, portfolio_id, update)
            .await
            .map_err(|e| not_found_to_trading(e, portfolio_id))
    }

    async fn delete_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<usize> {
        let deleted = self
            .repository
            .delete(user_id, portfolio_id)
            .await
            .map_err(|e| not_found_to_trading(e, portfolio_id))?;
        if deleted == 0 {
            return Err(Error::Trading(TradingError::PortfolioNotFound(
                portfolio_id.to_string(),
            )));
        }
        Ok(deleted)
    }
}

fn not_found_to_trading(error: Error, portfolio_id: &str) -> Error {
    if error.is_not_found() {
        Error::Trading(TradingError::PortfolioNotFound(portfolio_id.to_string()))
    } else {
        error
    }
}
