use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::positions::dsl::*;
use crate::schema::{positions, stocks};
use crate::stocks::StockDB;

use super::model::PositionDB;
use papertrade_core::constants::DECIMAL_PRECISION;
use papertrade_core::errors::DatabaseError;
use papertrade_core::positions::{NewPosition, Position, PositionRepositoryTrait};
use papertrade_core::stocks::Stock;
use papertrade_core::{Error, Result};

/// Repository for managing position records in the database.
///
/// Mutations take an explicit connection because they only ever happen
/// inside trade execution transactions driven by the writer actor.
pub struct PositionRepository {
    pool: Arc<DbPool>,
}

impl PositionRepository {
    /// Creates a new PositionRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl PositionRepositoryTrait for PositionRepository {
    fn find_by_portfolio_and_stock(
        &self,
        portfolio_id_param: &str,
        stock_id_param: &str,
    ) -> Result<Option<Position>> {
        let mut conn = get_connection(&self.pool)?;

        let position = positions
            .select(PositionDB::as_select())
            .filter(portfolio_id.eq(portfolio_id_param))
            .filter(stock_id.eq(stock_id_param))
            .first::<PositionDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(position.map(Position::from))
    }

    fn list_by_portfolio(&self, portfolio_id_param: &str) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)?;

        let results = positions
            .select(PositionDB::as_select())
            .filter(portfolio_id.eq(portfolio_id_param))
            .order(created_at.asc())
            .load::<PositionDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Position::from).collect())
    }

    /// Positions joined with their stock rows, ordered by symbol
    fn list_with_stocks(&self, portfolio_id_param: &str) -> Result<Vec<(Position, Stock)>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = positions
            .inner_join(stocks::table)
            .filter(portfolio_id.eq(portfolio_id_param))
            .select((PositionDB::as_select(), StockDB::as_select()))
            .order(stocks::symbol.asc())
            .load::<(PositionDB, StockDB)>(&mut conn)
            .into_core()?;

        Ok(rows
            .into_iter()
            .map(|(position, stock)| (position.into(), stock.into()))
            .collect())
    }

    fn find_in_transaction(
        &self,
        portfolio_id_param: &str,
        stock_id_param: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Option<Position>> {
        let position = positions
            .select(PositionDB::as_select())
            .filter(portfolio_id.eq(portfolio_id_param))
            .filter(stock_id.eq(stock_id_param))
            .first::<PositionDB>(conn)
            .optional()
            .into_core()?;

        Ok(position.map(Position::from))
    }

    fn insert_in_transaction(
        &self,
        new_position: NewPosition,
        conn: &mut SqliteConnection,
    ) -> Result<Position> {
        let now = chrono::Utc::now().naive_utc();
        let position_db = PositionDB {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: new_position.portfolio_id,
            stock_id: new_position.stock_id,
            quantity: new_position.quantity,
            average_buy_price: new_position
                .average_buy_price
                .round_dp(DECIMAL_PRECISION)
                .to_string(),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(positions::table)
            .values(&position_db)
            .execute(conn)
            .into_core()?;

        Ok(position_db.into())
    }

    fn update_in_transaction(
        &self,
        position_id: &str,
        quantity_param: i64,
        new_average: Decimal,
        conn: &mut SqliteConnection,
    ) -> Result<Position> {
        let affected = diesel::update(positions.find(position_id))
            .set((
                quantity.eq(quantity_param),
                average_buy_price.eq(new_average.round_dp(DECIMAL_PRECISION).to_string()),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .into_core()?;

        if affected == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Position {} not found",
                position_id
            ))));
        }

        let position = positions
            .select(PositionDB::as_select())
            .find(position_id)
            .first::<PositionDB>(conn)
            .into_core()?;

        Ok(position.into())
    }

    fn delete_in_transaction(&self, position_id: &str, conn: &mut SqliteConnection) -> Result<usize> {
        diesel::delete(positions.find(position_id))
            .execute(conn)
            .into_core()
    }
}
