use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error};
use rust_decimal::Decimal;

use crate::errors::TradingError;
use crate::portfolios::{Portfolio, PortfolioRepositoryTrait};
use crate::positions::PositionRepositoryTrait;
use crate::valuation::market_value;
use crate::{Error, Result};

use super::{
    NewSnapshot, PortfolioSnapshot, SnapshotBatchReport, SnapshotRepositoryTrait,
    SnapshotServiceTrait,
};

/// Service recording daily portfolio values.
pub struct SnapshotService {
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    positions: Arc<dyn PositionRepositoryTrait>,
    snapshots: Arc<dyn SnapshotRepositoryTrait>,
}

impl SnapshotService {
    pub fn new(
        portfolios: Arc<dyn PortfolioRepositoryTrait>,
        positions: Arc<dyn PositionRepositoryTrait>,
        snapshots: Arc<dyn SnapshotRepositoryTrait>,
    ) -> Self {
        Self {
            portfolios,
            positions,
            snapshots,
        }
    }

    /// Values `portfolio` at cached prices and inserts today's row.
    async fn snapshot_portfolio(&self, portfolio: &Portfolio) -> Result<PortfolioSnapshot> {
        let stock_value: Decimal = self
            .positions
            .list_with_stocks(&portfolio.id)?
            .iter()
            .map(|(position, stock)| market_value(position.quantity, stock.last_price))
            .sum();
        let snapshot_date = Utc::now().date_naive();

        self.snapshots
            .insert(NewSnapshot {
                portfolio_id: portfolio.id.clone(),
                snapshot_date,
                cash_balance: portfolio.cash_balance,
                stock_value,
                total_value: portfolio.cash_balance + stock_value,
            })
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    Error::DuplicateSnapshot {
                        portfolio_id: portfolio.id.clone(),
                        date: snapshot_date,
                    }
                } else {
                    e
                }
            })
    }
}

#[async_trait]
impl SnapshotServiceTrait for SnapshotService {
    async fn create_snapshot(
        &self,
        user_id: &str,
        portfolio_id: &str,
    ) -> Result<PortfolioSnapshot> {
        let portfolio = self.portfolios.get_by_id(user_id, portfolio_id).map_err(|e| {
            if e.is_not_found() {
                Error::Trading(TradingError::PortfolioNotFound(portfolio_id.to_string()))
            } else {
                e
            }
        })?;
        self.snapshot_portfolio(&portfolio).await
    }

    async fn create_daily_snapshots(&self) -> SnapshotBatchReport {
        let mut report = SnapshotBatchReport::default();
        let portfolios = match self.portfolios.list_all() {
            Ok(portfolios) => portfolios,
            Err(e) => {
                error!("Snapshot batch could not list portfolios: {}", e);
                return report;
            }
        };

        for portfolio in &portfolios {
            match self.snapshot_portfolio(portfolio).await {
                Ok(_) => report.created += 1,
                Err(Error::DuplicateSnapshot { portfolio_id, date }) => {
                    debug!("Snapshot already exists for {} on {}", portfolio_id, date);
                    report.skipped += 1;
                }
                Err(e) => {
                    error!("Snapshot failed for portfolio {}: {}", portfolio.id, e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    fn get_snapshots(&self, user_id: &str, portfolio_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        self.portfolios.get_by_id(user_id, portfolio_id).map_err(|e| {
            if e.is_not_found() {
                Error::Trading(TradingError::PortfolioNotFound(portfolio_id.to_string()))
            } else {
                e
            }
        })?;
        self.snapshots.list_by_portfolio(portfolio_id)
    }
}
