use async_trait::async_trait;
use diesel::SqliteConnection;
use rust_decimal::Decimal;

use crate::Result;

use super::{NewPortfolio, Portfolio, PortfolioUpdate};

/// Trait for portfolio repository operations.
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn get_by_id(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio>;
    fn list_by_user(&self, user_id: &str) -> Result<Vec<Portfolio>>;
    fn list_all(&self) -> Result<Vec<Portfolio>>;
    async fn create(
        &self,
        user_id: &str,
        new_portfolio: NewPortfolio,
        cash_balance: Decimal,
    ) -> Result<Portfolio>;
    async fn update(
        &self,
        user_id: &str,
        portfolio_id: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio>;
    async fn delete(&self, user_id: &str, portfolio_id: &str) -> Result<usize>;

    /// Reads a portfolio inside an open transaction, ignoring ownership.
    fn get_by_id_in_transaction(
        &self,
        portfolio_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Portfolio>;

    /// Writes a new cash balance inside an open transaction.
    fn set_cash_balance_in_transaction(
        &self,
        portfolio_id: &str,
        cash_balance: Decimal,
        conn: &mut SqliteConnection,
    ) -> Result<Portfolio>;
}

/// Trait defining the contract for portfolio services.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    async fn create_portfolio(&self, user_id: &str, new_portfolio: NewPortfolio)
        -> Result<Portfolio>;
    fn get_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio>;
    fn list_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>>;
    async fn update_portfolio(
        &self,
        user_id: &str,
        portfolio_id: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio>;
    async fn delete_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<usize>;
}
