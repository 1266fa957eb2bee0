use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::portfolios;
use crate::schema::portfolios::dsl::*;

use super::model::PortfolioDB;
use papertrade_core::constants::DECIMAL_PRECISION;
use papertrade_core::errors::DatabaseError;
use papertrade_core::portfolios::{
    NewPortfolio, Portfolio, PortfolioRepositoryTrait, PortfolioUpdate,
};
use papertrade_core::{Error, Result};

/// Repository for managing portfolio records in the database
pub struct PortfolioRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PortfolioRepository {
    /// Creates a new PortfolioRepository instance
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for PortfolioRepository {
    /// Retrieves a portfolio by id, scoped to its owner
    fn get_by_id(&self, owner_id: &str, portfolio_id_param: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;

        let portfolio = portfolios
            .select(PortfolioDB::as_select())
            .filter(id.eq(portfolio_id_param))
            .filter(user_id.eq(owner_id))
            .first::<PortfolioDB>(&mut conn)
            .into_core()?;

        Ok(portfolio.into())
    }

    fn list_by_user(&self, owner_id: &str) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;

        let results = portfolios
            .select(PortfolioDB::as_select())
            .filter(user_id.eq(owner_id))
            .order(created_at.asc())
            .load::<PortfolioDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Portfolio::from).collect())
    }

    /// Lists every portfolio regardless of owner. Used by the snapshot
    /// scheduler.
    fn list_all(&self) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;

        let results = portfolios
            .select(PortfolioDB::as_select())
            .order(created_at.asc())
            .load::<PortfolioDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Portfolio::from).collect())
    }

    async fn create(
        &self,
        owner_id: &str,
        new_portfolio: NewPortfolio,
        starting_cash: Decimal,
    ) -> Result<Portfolio> {
        new_portfolio.validate()?;
        let owner = owner_id.to_string();

        self.writer
            .exec(move |conn| {
                let now = chrono::Utc::now().naive_utc();
                let portfolio_db = PortfolioDB {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id: owner,
                    name: new_portfolio.name,
                    description: new_portfolio.description,
                    cash_balance: starting_cash.round_dp(DECIMAL_PRECISION).to_string(),
                    created_at: now,
                    updated_at: now,
                };

                diesel::insert_into(portfolios::table)
                    .values(&portfolio_db)
                    .execute(conn)
                    .into_core()?;

                Ok(portfolio_db.into())
            })
            .await
    }

    async fn update(
        &self,
        owner_id: &str,
        portfolio_id_param: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio> {
        update.validate()?;
        let owner = owner_id.to_string();
        let target = portfolio_id_param.to_string();

        self.writer
            .exec(move |conn| {
                let mut portfolio_db = portfolios
                    .select(PortfolioDB::as_select())
                    .filter(id.eq(&target))
                    .filter(user_id.eq(&owner))
                    .first::<PortfolioDB>(conn)
                    .into_core()?;

                portfolio_db.name = update.name;
                portfolio_db.description = update.description;
                portfolio_db.updated_at = chrono::Utc::now().naive_utc();

                // Explicit column list so a cleared description writes NULL.
                diesel::update(portfolios.find(&portfolio_db.id))
                    .set((
                        name.eq(&portfolio_db.name),
                        description.eq(portfolio_db.description.clone()),
                        updated_at.eq(portfolio_db.updated_at),
                    ))
                    .execute(conn)
                    .into_core()?;

                Ok(portfolio_db.into())
            })
            .await
    }

    /// Deletes a portfolio owned by the given user. Positions,
    /// transactions and snapshots go with it via ON DELETE CASCADE.
    async fn delete(&self, owner_id: &str, portfolio_id_param: &str) -> Result<usize> {
        let owner = owner_id.to_string();
        let target = portfolio_id_param.to_string();

        self.writer
            .exec(move |conn| {
                diesel::delete(
                    portfolios
                        .filter(id.eq(&target))
                        .filter(user_id.eq(&owner)),
                )
                .execute(conn)
                .into_core()
            })
            .await
    }

    fn get_by_id_in_transaction(
        &self,
        portfolio_id_param: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Portfolio> {
        let portfolio = portfolios
            .select(PortfolioDB::as_select())
            .find(portfolio_id_param)
            .first::<PortfolioDB>(conn)
            .into_core()?;

        Ok(portfolio.into())
    }

    fn set_cash_balance_in_transaction(
        &self,
        portfolio_id_param: &str,
        new_balance: Decimal,
        conn: &mut SqliteConnection,
    ) -> Result<Portfolio> {
        let affected = diesel::update(portfolios.find(portfolio_id_param))
            .set((
                cash_balance.eq(new_balance.round_dp(DECIMAL_PRECISION).to_string()),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .into_core()?;

        if affected == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Portfolio {} not found",
                portfolio_id_param
            ))));
        }

        let portfolio = portfolios
            .select(PortfolioDB::as_select())
            .find(portfolio_id_param)
            .first::<PortfolioDB>(conn)
            .into_core()?;

        Ok(portfolio.into())
    }
}
