use async_trait::async_trait;

use crate::Result;

use super::{NewSnapshot, PortfolioSnapshot, SnapshotBatchReport};

/// Trait for snapshot repository operations.
#[async_trait]
pub trait SnapshotRepositoryTrait: Send + Sync {
    /// Inserts a snapshot row; a same-day duplicate surfaces as a
    /// unique violation.
    async fn insert(&self, new_snapshot: NewSnapshot) -> Result<PortfolioSnapshot>;

    /// Snapshot history for a portfolio, newest first.
    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<PortfolioSnapshot>>;
}

/// Trait defining the contract for snapshot services.
#[async_trait]
pub trait SnapshotServiceTrait: Send + Sync {
    /// Values one portfolio and records today's snapshot.
    async fn create_snapshot(&self, user_id: &str, portfolio_id: &str)
        -> Result<PortfolioSnapshot>;

    /// Snapshots every portfolio in the system. Per-portfolio failures
    /// are counted, never fatal.
    async fn create_daily_snapshots(&self) -> SnapshotBatchReport;

    fn get_snapshots(&self, user_id: &str, portfolio_id: &str) -> Result<Vec<PortfolioSnapshot>>;
}
