use std::sync::Arc;

use rust_decimal::Decimal;

use crate::errors::TradingError;
use crate::portfolios::{Portfolio, PortfolioRepositoryTrait};
use crate::positions::PositionRepositoryTrait;
use crate::{Error, Result};

use super::{
    build_holding, market_value, Holding, PortfolioDetail, PortfolioOverview,
    ValuationServiceTrait,
};

/// Service computing portfolio values from cached prices.
pub struct ValuationService {
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    positions: Arc<dyn PositionRepositoryTrait>,
}

impl ValuationService {
    pub fn new(
        portfolios: Arc<dyn PortfolioRepositoryTrait>,
        positions: Arc<dyn PositionRepositoryTrait>,
    ) -> Self {
        Self {
            portfolios,
            positions,
        }
    }

    fn get_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio> {
        self.portfolios.get_by_id(user_id, portfolio_id).map_err(|e| {
            if e.is_not_found() {
                Error::Trading(TradingError::PortfolioNotFound(portfolio_id.to_string()))
            } else {
                e
            }
        })
    }

    fn value_positions(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        let rows = self.positions.list_with_stocks(portfolio_id)?;
        Ok(rows
            .iter()
            .map(|(position, stock)| build_holding(position, stock))
            .collect())
    }

    fn overview_from(portfolio: &Portfolio, holdings: &[Holding]) -> PortfolioOverview {
        let stock_value: Decimal = holdings
            .iter()
            .map(|h| market_value(h.quantity, h.current_price))
            .sum();
        PortfolioOverview {
            id: portfolio.id.clone(),
            name: portfolio.name.clone(),
            description: portfolio.description.clone(),
            cash_balance: portfolio.cash_balance,
            stock_value,
            total_value: portfolio.cash_balance + stock_value,
            positions_count: holdings.len() as i64,
            created_at: portfolio.created_at,
            updated_at: portfolio.updated_at,
        }
    }
}

impl ValuationServiceTrait for ValuationService {
    fn portfolio_overview(&self, user_id: &str, portfolio_id: &str) -> Result<PortfolioOverview> {
        let portfolio = self.get_portfolio(user_id, portfolio_id)?;
        let holdings = self.value_positions(&portfolio.id)?;
        Ok(Self::overview_from(&portfolio, &holdings))
    }

    fn portfolio_detail(&self, user_id: &str, portfolio_id: &str) -> Result<PortfolioDetail> {
        let portfolio = self.get_portfolio(user_id, portfolio_id)?;
        let holdings = self.value_positions(&portfolio.id)?;
        let overview = Self::overview_from(&portfolio, &holdings);
        Ok(PortfolioDetail {
            id: overview.id,
            name: overview.name,
            description: overview.description,
            cash_balance: overview.cash_balance,
            stock_value: overview.stock_value,
            total_value: overview.total_value,
            holdings,
            created_at: overview.created_at,
            updated_at: overview.updated_at,
        })
    }

    fn list_overviews(&self, user_id: &str) -> Result<Vec<PortfolioOverview>> {
        let portfolios = self.portfolios.list_by_user(user_id)?;
        portfolios
            .iter()
            .map(|portfolio| {
                let holdings = self.value_positions(&portfolio.id)?;
                Ok(Self::overview_from(portfolio, &holdings))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DatabaseError;
    use crate::portfolios::{NewPortfolio, PortfolioUpdate};
    use crate::positions::{NewPosition, Position};
    use crate::stocks::Stock;
    use async_trait::async_trait;
    use chrono::Utc;
    use diesel::SqliteConnection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct FixedPortfolios(Vec<Portfolio>);
    struct FixedPositions(Vec<(Position, Stock)>);

    #[async_trait]
    impl PortfolioRepositoryTrait for FixedPortfolios {
        fn get_by_id(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio> {
            self.0
                .iter()
                .find(|p| p.id == portfolio_id && p.user_id == user_id)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))
        }

        fn list_by_user(&self, user_id: &str) -> Result<Vec<Portfolio>> {
            Ok(self
                .0
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect())
        }

        fn list_all(&self) -> Result<Vec<Portfolio>> {
            Ok(self.0.clone())
        }

        async fn create(
            &self,
            _user_id: &str,
            _new_portfolio: NewPortfolio,
            _cash_balance: Decimal,
        ) -> Result<Portfolio> {
            unimplemented!("not exercised")
        }

        async fn update(
            &self,
            _user_id: &str,
            _portfolio_id: &str,
            _update: PortfolioUpdate,
        ) -> Result<Portfolio> {
            unimplemented!("not exercised")
        }

        async fn delete(&self, _user_id: &str, _portfolio_id: &str) -> Result<usize> {
            unimplemented!("not exercised")
        }

        fn get_by_id_in_transaction(
            &self,
            _portfolio_id: &str,
            _conn: &mut SqliteConnection,
        ) -> Result<Portfolio> {
            unimplemented!("not exercised")
        }

        fn set_cash_balance_in_transaction(
            &self,
            _portfolio_id: &str,
            _cash_balance: Decimal,
            _conn: &mut SqliteConnection,
        ) -> Result<Portfolio> {
            unimplemented!("not exercised")
        }
    }

    impl PositionRepositoryTrait for FixedPositions {
        fn find_by_portfolio_and_stock(
            &self,
            portfolio_id: &str,
            stock_id: &str,
        ) -> Result<Option<Position>> {
            Ok(self
                .0
                .iter()
                .find(|(p, s)| p.portfolio_id == portfolio_id && s.id == stock_id)
                .map(|(p, _)| p.clone()))
        }

        fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Position>> {
            Ok(self
                .0
                .iter()
                .filter(|(p, _)| p.portfolio_id == portfolio_id)
                .map(|(p, _)| p.clone())
                .collect())
        }

        fn list_with_stocks(&self, portfolio_id: &str) -> Result<Vec<(Position, Stock)>> {
            Ok(self
                .0
                .iter()
                .filter(|(p, _)| p.portfolio_id == portfolio_id)
                .cloned()
                .collect())
        }

        fn find_in_transaction(
            &self,
            _portfolio_id: &str,
            _stock_id: &str,
            _conn: &mut SqliteConnection,
        ) -> Result<Option<Position>> {
            unimplemented!("not exercised")
        }

        fn insert_in_transaction(
            &self,
            _new_position: NewPosition,
            _conn: &mut SqliteConnection,
        ) -> Result<Position> {
            unimplemented!("not exercised")
        }

        fn update_in_transaction(
            &self,
            _position_id: &str,
            _quantity: i64,
            _average_buy_price: Decimal,
            _conn: &mut SqliteConnection,
        ) -> Result<Position> {
            unimplemented!("not exercised")
        }

        fn delete_in_transaction(
            &self,
            _position_id: &str,
            _conn: &mut SqliteConnection,
        ) -> Result<usize> {
            unimplemented!("not exercised")
        }
    }

    fn portfolio(id: &str, user_id: &str, cash: Decimal) -> Portfolio {
        let now = Utc::now().naive_utc();
        Portfolio {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: "Main".to_string(),
            description: None,
            cash_balance: cash,
            created_at: now,
            updated_at: now,
        }
    }

    fn holding_row(
        portfolio_id: &str,
        stock_id: &str,
        symbol: &str,
        quantity: i64,
        avg: Decimal,
        price: Decimal,
    ) -> (Position, Stock) {
        let now = Utc::now().naive_utc();
        (
            Position {
                id: format!("pos-{}", stock_id),
                portfolio_id: portfolio_id.to_string(),
                stock_id: stock_id.to_string(),
                quantity,
                average_buy_price: avg,
                created_at: now,
                updated_at: now,
            },
            Stock {
                id: stock_id.to_string(),
                symbol: symbol.to_string(),
                company_name: format!("{} Inc", symbol),
                last_price: price,
                last_updated: now,
            },
        )
    }

    #[test]
    fn test_overview_totals() {
        let service = ValuationService::new(
            Arc::new(FixedPortfolios(vec![portfolio("p1", "u1", dec!(9200))])),
            Arc::new(FixedPositions(vec![holding_row(
                "p1",
                "s1",
                "AAPL",
                15,
                dec!(60),
                dec!(80),
            )])),
        );

        let overview = service.portfolio_overview("u1", "p1").unwrap();
        assert_eq!(overview.stock_value, dec!(1200));
        assert_eq!(overview.total_value, dec!(10400));
        assert_eq!(overview.positions_count, 1);
    }

    #[test]
    fn test_detail_lists_valued_holdings() {
        let service = ValuationService::new(
            Arc::new(FixedPortfolios(vec![portfolio("p1", "u1", dec!(1000))])),
            Arc::new(FixedPositions(vec![
                holding_row("p1", "s1", "AAPL", 10, dec!(50), dec!(55)),
                holding_row("p1", "s2", "MSFT", 2, dec!(300), dec!(250)),
            ])),
        );

        let detail = service.portfolio_detail("u1", "p1").unwrap();
        assert_eq!(detail.holdings.len(), 2);
        assert_eq!(detail.stock_value, dec!(550) + dec!(500));
        assert_eq!(detail.total_value, dec!(2050));

        let apple = &detail.holdings[0];
        assert_eq!(apple.profit_loss, dec!(50));
        assert_eq!(apple.profit_loss_percentage, dec!(10.00));

        let msft = &detail.holdings[1];
        assert_eq!(msft.profit_loss, dec!(-100));
    }

    #[test]
    fn test_empty_portfolio_is_all_cash() {
        let service = ValuationService::new(
            Arc::new(FixedPortfolios(vec![portfolio("p1", "u1", dec!(10000))])),
            Arc::new(FixedPositions(vec![])),
        );

        let overview = service.portfolio_overview("u1", "p1").unwrap();
        assert_eq!(overview.stock_value, Decimal::ZERO);
        assert_eq!(overview.total_value, dec!(10000));
        assert_eq!(overview.positions_count, 0);
    }

    #[test]
    fn test_overview_scopes_by_owner() {
        let service = ValuationService::new(
            Arc::new(FixedPortfolios(vec![portfolio("p1", "u1", dec!(10000))])),
            Arc::new(FixedPositions(vec![])),
        );

        let err = service.portfolio_overview("u2", "p1").unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::PortfolioNotFound(_))
        ));
    }

    #[test]
    fn test_list_overviews_covers_every_portfolio() {
        let service = ValuationService::new(
            Arc::new(FixedPortfolios(vec![
                portfolio("p1", "u1", dec!(100)),
                portfolio("p2", "u1", dec!(200)),
                portfolio("p3", "u2", dec!(300)),
            ])),
            Arc::new(FixedPositions(vec![])),
        );

        let overviews = service.list_overviews("u1").unwrap();
        assert_eq!(overviews.len(), 2);
    }
}
