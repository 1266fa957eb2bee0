use async_trait::async_trait;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::stocks;
use crate::schema::stocks::dsl::*;

use super::model::StockDB;
use papertrade_core::constants::DECIMAL_PRECISION;
use papertrade_core::stocks::{Stock, StockRepositoryTrait};
use papertrade_core::Result;

/// Repository for managing stock records in the database
pub struct StockRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl StockRepository {
    /// Creates a new StockRepository instance
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl StockRepositoryTrait for StockRepository {
    fn get_by_id(&self, stock_id: &str) -> Result<Stock> {
        let mut conn = get_connection(&self.pool)?;

        let stock = stocks
            .select(StockDB::as_select())
            .find(stock_id)
            .first::<StockDB>(&mut conn)
            .into_core()?;

        Ok(stock.into())
    }

    fn get_by_symbol(&self, symbol_param: &str) -> Result<Stock> {
        let mut conn = get_connection(&self.pool)?;

        let stock = stocks
            .select(StockDB::as_select())
            .filter(symbol.eq(symbol_param))
            .first::<StockDB>(&mut conn)
            .into_core()?;

        Ok(stock.into())
    }

    /// Lists known stocks, optionally filtered by a symbol or company
    /// name fragment
    fn list(&self, query: Option<&str>) -> Result<Vec<Stock>> {
        let mut conn = get_connection(&self.pool)?;

        let mut stmt = stocks::table.into_boxed();

        if let Some(q) = query {
            let pattern = format!("%{}%", q.trim());
            stmt = stmt.filter(
                symbol
                    .like(pattern.clone())
                    .or(company_name.like(pattern)),
            );
        }

        let results = stmt
            .select(StockDB::as_select())
            .order(symbol.asc())
            .load::<StockDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Stock::from).collect())
    }

    async fn create(&self, symbol_param: &str, company: &str, price: Decimal) -> Result<Stock> {
        let sym = symbol_param.to_string();
        let name = company.to_string();

        self.writer
            .exec(move |conn| {
                let stock_db = StockDB {
                    id: uuid::Uuid::new_v4().to_string(),
                    symbol: sym,
                    company_name: name,
                    last_price: price.round_dp(DECIMAL_PRECISION).to_string(),
                    last_updated: chrono::Utc::now().naive_utc(),
                };

                diesel::insert_into(stocks::table)
                    .values(&stock_db)
                    .execute(conn)
                    .into_core()?;

                Ok(stock_db.into())
            })
            .await
    }

    /// Returns the row for `symbol`, inserting a priceless placeholder
    /// when the symbol is new. Runs as a single writer job, so two
    /// concurrent callers cannot both insert.
    async fn get_or_create(&self, symbol_param: &str) -> Result<(Stock, bool)> {
        let sym = symbol_param.to_string();

        self.writer
            .exec(move |conn| {
                let existing = stocks
                    .select(StockDB::as_select())
                    .filter(symbol.eq(&sym))
                    .first::<StockDB>(conn)
                    .optional()
                    .into_core()?;

                if let Some(stock_db) = existing {
                    return Ok((stock_db.into(), false));
                }

                let stock_db = StockDB {
                    id: uuid::Uuid::new_v4().to_string(),
                    symbol: sym,
                    company_name: String::new(),
                    last_price: Decimal::ZERO.to_string(),
                    last_updated: chrono::Utc::now().naive_utc(),
                };

                diesel::insert_into(stocks::table)
                    .values(&stock_db)
                    .execute(conn)
                    .into_core()?;

                Ok((stock_db.into(), true))
            })
            .await
    }

    async fn update_market_data(
        &self,
        stock_id: &str,
        price: Decimal,
        company: Option<String>,
    ) -> Result<Stock> {
        let target = stock_id.to_string();

        self.writer
            .exec(move |conn| {
                let mut stock_db = stocks
                    .select(StockDB::as_select())
                    .find(&target)
                    .first::<StockDB>(conn)
                    .into_core()?;

                stock_db.last_price = price.round_dp(DECIMAL_PRECISION).to_string();
                stock_db.last_updated = chrono::Utc::now().naive_utc();
                if let Some(name) = company {
                    stock_db.company_name = name;
                }

                diesel::update(stocks.find(&stock_db.id))
                    .set(&stock_db)
                    .execute(conn)
                    .into_core()?;

                Ok(stock_db.into())
            })
            .await
    }
}
