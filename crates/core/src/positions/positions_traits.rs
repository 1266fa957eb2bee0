use diesel::SqliteConnection;
use rust_decimal::Decimal;

use crate::stocks::Stock;
use crate::Result;

use super::{NewPosition, Position};

/// Trait for position repository operations.
///
/// Mutations only exist in `_in_transaction` form: positions change
/// exclusively inside trade execution units.
pub trait PositionRepositoryTrait: Send + Sync {
    fn find_by_portfolio_and_stock(
        &self,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<Option<Position>>;
    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Position>>;

    /// Positions joined with their stock rows, for valuation.
    fn list_with_stocks(&self, portfolio_id: &str) -> Result<Vec<(Position, Stock)>>;

    fn find_in_transaction(
        &self,
        portfolio_id: &str,
        stock_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Option<Position>>;
    fn insert_in_transaction(
        &self,
        new_position: NewPosition,
        conn: &mut SqliteConnection,
    ) -> Result<Position>;
    fn update_in_transaction(
        &self,
        position_id: &str,
        quantity: i64,
        average_buy_price: Decimal,
        conn: &mut SqliteConnection,
    ) -> Result<Position>;
    fn delete_in_transaction(
        &self,
        position_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<usize>;
}
