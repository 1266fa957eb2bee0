use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use rust_decimal::Decimal;

use crate::constants::DECIMAL_PRECISION;
use crate::db::DbTransactionExecutor;
use crate::errors::TradingError;
use crate::portfolios::{Portfolio, PortfolioRepositoryTrait};
use crate::positions::{NewPosition, PositionRepositoryTrait};
use crate::quotes::PriceResolver;
use crate::stocks::{normalize_symbol, StockRepositoryTrait};
use crate::transactions::{NewTransaction, TradeSide, TransactionRepositoryTrait};
use crate::{Error, Result};

use super::{TradeOrder, TradeOutcome, TradingServiceTrait};

/// Executes buy and sell orders.
///
/// Price resolution and quote persistence happen before the write unit;
/// everything that moves cash or shares happens inside one serialized
/// transaction, with balances re-read and re-checked there.
pub struct TradingService<E>
where
    E: DbTransactionExecutor,
{
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    stocks: Arc<dyn StockRepositoryTrait>,
    positions: Arc<dyn PositionRepositoryTrait>,
    transactions: Arc<dyn TransactionRepositoryTrait>,
    resolver: PriceResolver,
    executor: E,
}

impl<E> TradingService<E>
where
    E: DbTransactionExecutor,
{
    pub fn new(
        portfolios: Arc<dyn PortfolioRepositoryTrait>,
        stocks: Arc<dyn StockRepositoryTrait>,
        positions: Arc<dyn PositionRepositoryTrait>,
        transactions: Arc<dyn TransactionRepositoryTrait>,
        resolver: PriceResolver,
        executor: E,
    ) -> Self {
        Self {
            portfolios,
            stocks,
            positions,
            transactions,
            resolver,
            executor,
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
}

#[async_trait]
impl<E> TradingServiceTrait for TradingService<E>
where
    E: DbTransactionExecutor,
{
    async fn execute_buy(&self, user_id: &str, order: TradeOrder) -> Result<TradeOutcome> {
        order.validate()?;
        let symbol = normalize_symbol(&order.symbol)?;
        let portfolio = self.get_portfolio(user_id, &order.portfolio_id)?;

        let (stock, created) = self.stocks.get_or_create(&symbol).await?;

        // A buy must execute at a real quote. The cached price is only
        // trusted when the row predates this order and already holds one.
        let force_refresh = created || !stock.has_price();
        let resolved = self.resolver.resolve(&stock, force_refresh).await?;
        let price = resolved.price;
        if resolved.refreshed {
            self.stocks
                .update_market_data(&stock.id, price, resolved.company_name)
                .await?;
        }

        let trade_total = Decimal::from(order.quantity) * price;
        if portfolio.cash_balance < trade_total {
            return Err(Error::Trading(TradingError::InsufficientFunds {
                required: trade_total,
                available: portfolio.cash_balance,
            }));
        }

        let portfolios = self.portfolios.clone();
        let positions = self.positions.clone();
        let transactions = self.transactions.clone();
        let portfolio_id = portfolio.id.clone();
        let stock_id = stock.id.clone();
        let quantity = order.quantity;

        let (cash_balance, position, ledger_row) = self
            .executor
            .execute(move |conn| {
                let portfolio = portfolios.get_by_id_in_transaction(&portfolio_id, conn)?;
                if portfolio.cash_balance < trade_total {
                    return Err(Error::Trading(TradingError::InsufficientFunds {
                        required: trade_total,
                        available: portfolio.cash_balance,
                    }));
                }
                let updated = portfolios.set_cash_balance_in_transaction(
                    &portfolio_id,
                    portfolio.cash_balance - trade_total,
                    conn,
                )?;

                let position = match positions.find_in_transaction(&portfolio_id, &stock_id, conn)? {
                    Some(existing) => {
                        let total_quantity = existing.quantity + quantity;
                        let blended = (Decimal::from(existing.quantity)
                            * existing.average_buy_price
                            + Decimal::from(quantity) * price)
                            / Decimal::from(total_quantity);
                        positions.update_in_transaction(
                            &existing.id,
                            total_quantity,
                            blended.round_dp(DECIMAL_PRECISION),
                            conn,
                        )?
                    }
                    None => positions.insert_in_transaction(
                        NewPosition {
                            portfolio_id: portfolio_id.clone(),
                            stock_id: stock_id.clone(),
                            quantity,
                            average_buy_price: price,
                        },
                        conn,
                    )?,
                };

                let ledger_row = transactions.insert_in_transaction(
                    NewTransaction {
                        portfolio_id: portfolio_id.clone(),
                        stock_id: stock_id.clone(),
                        side: TradeSide::Buy,
                        quantity,
                        price,
                    },
                    conn,
                )?;

                Ok((updated.cash_balance, position, ledger_row))
            })
            .await?;

        Ok(TradeOutcome {
            side: TradeSide::Buy,
            symbol,
            quantity: order.quantity,
            price,
            trade_total,
            cash_balance,
            position: Some(position),
            transaction_id: ledger_row.id,
        })
    }

    async fn execute_sell(&self, user_id: &str, order: TradeOrder) -> Result<TradeOutcome> {
        order.validate()?;
        let symbol = normalize_symbol(&order.symbol)?;
        let portfolio = self.get_portfolio(user_id, &order.portfolio_id)?;

        let stock = self.stocks.get_by_symbol(&symbol).map_err(|e| {
            if e.is_not_found() {
                Error::Trading(TradingError::StockNotFound(symbol.clone()))
            } else {
                e
            }
        })?;

        let held = self
            .positions
            .find_by_portfolio_and_stock(&portfolio.id, &stock.id)?
            .ok_or_else(|| Error::Trading(TradingError::NoPosition(symbol.clone())))?;
        if held.quantity < order.quantity {
            return Err(Error::Trading(TradingError::InsufficientShares {
                requested: order.quantity,
                held: held.quantity,
            }));
        }

        // Sells prefer a fresh quote but fall back to the cached price
        // rather than trapping the user in a position.
        let price = match self.resolver.resolve(&stock, true).await {
            Ok(resolved) => {
                self.stocks
                    .update_market_data(&stock.id, resolved.price, resolved.company_name)
                    .await?;
                resolved.price
            }
            Err(e) => {
                warn!(
                    "Quote refresh failed for {}, selling at cached price: {}",
                    symbol, e
                );
                stock.last_price
            }
        };

        let portfolios = self.portfolios.clone();
        let positions = self.positions.clone();
        let transactions = self.transactions.clone();
        let portfolio_id = portfolio.id.clone();
        let stock_id = stock.id.clone();
        let tx_symbol = symbol.clone();
        let quantity = order.quantity;
        let trade_total = Decimal::from(quantity) * price;

        let (cash_balance, position, ledger_row) = self
            .executor
            .execute(move |conn| {
                let portfolio = portfolios.get_by_id_in_transaction(&portfolio_id, conn)?;
                let held = positions
                    .find_in_transaction(&portfolio_id, &stock_id, conn)?
                    .ok_or_else(|| Error::Trading(TradingError::NoPosition(tx_symbol.clone())))?;
                if held.quantity < quantity {
                    return Err(Error::Trading(TradingError::InsufficientShares {
                        requested: quantity,
                        held: held.quantity,
                    }));
                }

                let updated = portfolios.set_cash_balance_in_transaction(
                    &portfolio_id,
                    portfolio.cash_balance + trade_total,
                    conn,
                )?;

                let remaining = held.quantity - quantity;
                let position = if remaining == 0 {
                    positions.delete_in_transaction(&held.id, conn)?;
                    None
                } else {
                    Some(positions.update_in_transaction(
                        &held.id,
                        remaining,
                        held.average_buy_price,
                        conn,
                    )?)
                };

                let ledger_row = transactions.insert_in_transaction(
                    NewTransaction {
                        portfolio_id: portfolio_id.clone(),
                        stock_id: stock_id.clone(),
                        side: TradeSide::Sell,
                        quantity,
                        price,
                    },
                    conn,
                )?;

                Ok((updated.cash_balance, position, ledger_row))
            })
            .await?;

        Ok(TradeOutcome {
            side: TradeSide::Sell,
            symbol,
            quantity: order.quantity,
            price,
            trade_total,
            cash_balance,
            position,
            transaction_id: ledger_row.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DatabaseError;
    use crate::portfolios::Portfolio;
    use crate::positions::Position;
    use crate::stocks::Stock;
    use crate::transactions::{Transaction, TransactionEntry};
    use chrono::Utc;
    use diesel::{Connection, SqliteConnection};
    use papertrade_market_data::{
        CompanyProfile, MarketDataError, MarketDataProvider, Quote, SymbolSearchResult,
    };
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Store {
        portfolios: Vec<Portfolio>,
        stocks: Vec<Stock>,
        positions: Vec<Position>,
        transactions: Vec<Transaction>,
        next_id: u64,
    }

    impl Store {
        fn next_id(&mut self, prefix: &str) -> String {
            self.next_id += 1;
            format!("{}-{}", prefix, self.next_id)
        }
    }

    struct MockPortfolios(Arc<Mutex<Store>>);
    struct MockStocks(Arc<Mutex<Store>>);
    struct MockPositions(Arc<Mutex<Store>>);
    struct MockTransactions(Arc<Mutex<Store>>);

    #[async_trait]
    impl PortfolioRepositoryTrait for MockPortfolios {
        fn get_by_id(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio> {
            self.0
                .lock()
                .unwrap()
                .portfolios
                .iter()
                .find(|p| p.id == portfolio_id && p.user_id == user_id)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))
        }

        fn list_by_user(&self, user_id: &str) -> Result<Vec<Portfolio>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .portfolios
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect())
        }

        fn list_all(&self) -> Result<Vec<Portfolio>> {
            Ok(self.0.lock().unwrap().portfolios.clone())
        }

        async fn create(
            &self,
            _user_id: &str,
            _new_portfolio: crate::portfolios::NewPortfolio,
            _cash_balance: Decimal,
        ) -> Result<Portfolio> {
            unimplemented!("not exercised")
        }

        async fn update(
            &self,
            _user_id: &str,
            _portfolio_id: &str,
            _update: crate::portfolios::PortfolioUpdate,
        ) -> Result<Portfolio> {
            unimplemented!("not exercised")
        }

        async fn delete(&self, _user_id: &str, _portfolio_id: &str) -> Result<usize> {
            unimplemented!("not exercised")
        }

        fn get_by_id_in_transaction(
            &self,
            portfolio_id: &str,
            _conn: &mut SqliteConnection,
        ) -> Result<Portfolio> {
            self.0
                .lock()
                .unwrap()
                .portfolios
                .iter()
                .find(|p| p.id == portfolio_id)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))
        }

        fn set_cash_balance_in_transaction(
            &self,
            portfolio_id: &str,
            cash_balance: Decimal,
            _conn: &mut SqliteConnection,
        ) -> Result<Portfolio> {
            let mut store = self.0.lock().unwrap();
            let portfolio = store
                .portfolios
                .iter_mut()
                .find(|p| p.id == portfolio_id)
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))?;
            portfolio.cash_balance = cash_balance;
            Ok(portfolio.clone())
        }
    }

    #[async_trait]
    impl StockRepositoryTrait for MockStocks {
        fn get_by_id(&self, stock_id: &str) -> Result<Stock> {
            self.0
                .lock()
                .unwrap()
                .stocks
                .iter()
                .find(|s| s.id == stock_id)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))
        }

        fn get_by_symbol(&self, symbol: &str) -> Result<Stock> {
            self.0
                .lock()
                .unwrap()
                .stocks
                .iter()
                .find(|s| s.symbol == symbol)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))
        }

        fn list(&self, _query: Option<&str>) -> Result<Vec<Stock>> {
            Ok(self.0.lock().unwrap().stocks.clone())
        }

        async fn create(
            &self,
            symbol: &str,
            company_name: &str,
            price: Decimal,
        ) -> Result<Stock> {
            let mut store = self.0.lock().unwrap();
            let id = store.next_id("stock");
            let stock = Stock {
                id,
                symbol: symbol.to_string(),
                company_name: company_name.to_string(),
                last_price: price,
                last_updated: Utc::now().naive_utc(),
            };
            store.stocks.push(stock.clone());
            Ok(stock)
        }

        async fn get_or_create(&self, symbol: &str) -> Result<(Stock, bool)> {
            let mut store = self.0.lock().unwrap();
            if let Some(existing) = store.stocks.iter().find(|s| s.symbol == symbol) {
                return Ok((existing.clone(), false));
            }
            let id = store.next_id("stock");
            let stock = Stock {
                id,
                symbol: symbol.to_string(),
                company_name: String::new(),
                last_price: Decimal::ZERO,
                last_updated: Utc::now().naive_utc(),
            };
            store.stocks.push(stock.clone());
            Ok((stock, true))
        }

        async fn update_market_data(
            &self,
            stock_id: &str,
            price: Decimal,
            company_name: Option<String>,
        ) -> Result<Stock> {
            let mut store = self.0.lock().unwrap();
            let stock = store
                .stocks
                .iter_mut()
                .find(|s| s.id == stock_id)
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))?;
            stock.last_price = price;
            if let Some(name) = company_name {
                stock.company_name = name;
            }
            stock.last_updated = Utc::now().naive_utc();
            Ok(stock.clone())
        }
    }

    impl PositionRepositoryTrait for MockPositions {
        fn find_by_portfolio_and_stock(
            &self,
            portfolio_id: &str,
            stock_id: &str,
        ) -> Result<Option<Position>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .positions
                .iter()
                .find(|p| p.portfolio_id == portfolio_id && p.stock_id == stock_id)
                .cloned())
        }

        fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Position>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .positions
                .iter()
                .filter(|p| p.portfolio_id == portfolio_id)
                .cloned()
                .collect())
        }

        fn list_with_stocks(&self, portfolio_id: &str) -> Result<Vec<(Position, Stock)>> {
            let store = self.0.lock().unwrap();
            Ok(store
                .positions
                .iter()
                .filter(|p| p.portfolio_id == portfolio_id)
                .filter_map(|p| {
                    store
                        .stocks
                        .iter()
                        .find(|s| s.id == p.stock_id)
                        .map(|s| (p.clone(), s.clone()))
                })
                .collect())
        }

        fn find_in_transaction(
            &self,
            portfolio_id: &str,
            stock_id: &str,
            _conn: &mut SqliteConnection,
        ) -> Result<Option<Position>> {
            self.find_by_portfolio_and_stock(portfolio_id, stock_id)
        }

        fn insert_in_transaction(
            &self,
            new_position: NewPosition,
            _conn: &mut SqliteConnection,
        ) -> Result<Position> {
            let mut store = self.0.lock().unwrap();
            let id = store.next_id("pos");
            let now = Utc::now().naive_utc();
            let position = Position {
                id,
                portfolio_id: new_position.portfolio_id,
                stock_id: new_position.stock_id,
                quantity: new_position.quantity,
                average_buy_price: new_position.average_buy_price,
                created_at: now,
                updated_at: now,
            };
            store.positions.push(position.clone());
            Ok(position)
        }

        fn update_in_transaction(
            &self,
            position_id: &str,
            quantity: i64,
            average_buy_price: Decimal,
            _conn: &mut SqliteConnection,
        ) -> Result<Position> {
            let mut store = self.0.lock().unwrap();
            let position = store
                .positions
                .iter_mut()
                .find(|p| p.id == position_id)
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))?;
            position.quantity = quantity;
            position.average_buy_price = average_buy_price;
            position.updated_at = Utc::now().naive_utc();
            Ok(position.clone())
        }

        fn delete_in_transaction(
            &self,
            position_id: &str,
            _conn: &mut SqliteConnection,
        ) -> Result<usize> {
            let mut store = self.0.lock().unwrap();
            let before = store.positions.len();
            store.positions.retain(|p| p.id != position_id);
            Ok(before - store.positions.len())
        }
    }

    impl TransactionRepositoryTrait for MockTransactions {
        fn list_by_portfolio(
            &self,
            portfolio_id: &str,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<TransactionEntry>> {
            let store = self.0.lock().unwrap();
            Ok(store
                .transactions
                .iter()
                .filter(|t| t.portfolio_id == portfolio_id)
                .map(|t| TransactionEntry {
                    id: t.id.clone(),
                    symbol: store
                        .stocks
                        .iter()
                        .find(|s| s.id == t.stock_id)
                        .map(|s| s.symbol.clone())
                        .unwrap_or_default(),
                    side: t.side,
                    quantity: t.quantity,
                    price: t.price,
                    total_amount: t.total_amount(),
                    timestamp: t.timestamp,
                })
                .collect())
        }

        fn insert_in_transaction(
            &self,
            new_transaction: NewTransaction,
            _conn: &mut SqliteConnection,
        ) -> Result<Transaction> {
            let mut store = self.0.lock().unwrap();
            let id = store.next_id("txn");
            let transaction = Transaction {
                id,
                portfolio_id: new_transaction.portfolio_id,
                stock_id: new_transaction.stock_id,
                side: new_transaction.side,
                quantity: new_transaction.quantity,
                price: new_transaction.price,
                timestamp: Utc::now().naive_utc(),
            };
            store.transactions.push(transaction.clone());
            Ok(transaction)
        }
    }

    struct StubProvider {
        price: Mutex<Option<Decimal>>,
    }

    impl StubProvider {
        fn quoting(price: Decimal) -> Arc<Self> {
            Arc::new(Self {
                price: Mutex::new(Some(price)),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                price: Mutex::new(None),
            })
        }

        fn set_price(&self, price: Decimal) {
            *self.price.lock().unwrap() = Some(price);
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        fn id(&self) -> &'static str {
            "STUB"
        }

        async fn get_quote(&self, symbol: &str) -> std::result::Result<Quote, MarketDataError> {
            match *self.price.lock().unwrap() {
                Some(price) => Ok(Quote::new(Utc::now(), price, "STUB".to_string())),
                None => Err(MarketDataError::ProviderError {
                    provider: "STUB".to_string(),
                    message: format!("no quote for {}", symbol),
                }),
            }
        }

        async fn get_profile(
            &self,
            symbol: &str,
        ) -> std::result::Result<CompanyProfile, MarketDataError> {
            Ok(CompanyProfile {
                name: Some(format!("{} Inc", symbol)),
                ticker: Some(symbol.to_string()),
                exchange: None,
                industry: None,
                country: None,
                website: None,
            })
        }

        async fn search(
            &self,
            _query: &str,
        ) -> std::result::Result<Vec<SymbolSearchResult>, MarketDataError> {
            Ok(vec![])
        }
    }

    struct TestExecutor {
        conn: Arc<Mutex<SqliteConnection>>,
    }

    impl TestExecutor {
        fn new() -> Self {
            Self {
                conn: Arc::new(Mutex::new(
                    SqliteConnection::establish(":memory:").unwrap(),
                )),
            }
        }
    }

    #[async_trait]
    impl DbTransactionExecutor for TestExecutor {
        async fn execute<F, T>(&self, f: F) -> Result<T>
        where
            F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
            T: Send + 'static,
        {
            let mut conn = self.conn.lock().unwrap();
            f(&mut conn)
        }
    }

    fn seed_portfolio(store: &Arc<Mutex<Store>>, id: &str, user_id: &str, cash: Decimal) {
        let now = Utc::now().naive_utc();
        store.lock().unwrap().portfolios.push(Portfolio {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: "Main".to_string(),
            description: None,
            cash_balance: cash,
            created_at: now,
            updated_at: now,
        });
    }

    fn seed_stock(store: &Arc<Mutex<Store>>, id: &str, symbol: &str, price: Decimal) {
        store.lock().unwrap().stocks.push(Stock {
            id: id.to_string(),
            symbol: symbol.to_string(),
            company_name: format!("{} Inc", symbol),
            last_price: price,
            last_updated: Utc::now().naive_utc(),
        });
    }

    fn service(
        store: &Arc<Mutex<Store>>,
        provider: Arc<StubProvider>,
    ) -> TradingService<TestExecutor> {
        TradingService::new(
            Arc::new(MockPortfolios(store.clone())),
            Arc::new(MockStocks(store.clone())),
            Arc::new(MockPositions(store.clone())),
            Arc::new(MockTransactions(store.clone())),
            PriceResolver::new(provider),
            TestExecutor::new(),
        )
    }

    fn order(portfolio_id: &str, symbol: &str, quantity: i64) -> TradeOrder {
        TradeOrder {
            portfolio_id: portfolio_id.to_string(),
            symbol: symbol.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_buy_then_average_then_partial_sell() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        let provider = StubProvider::quoting(dec!(50));
        let svc = service(&store, provider.clone());

        // First buy creates the position at the fetched price.
        let outcome = svc.execute_buy("u1", order("p1", "aapl", 10)).await.unwrap();
        assert_eq!(outcome.cash_balance, dec!(9500));
        assert_eq!(outcome.trade_total, dec!(500));
        let position = outcome.position.unwrap();
        assert_eq!(position.quantity, 10);
        assert_eq!(position.average_buy_price, dec!(50));

        // Second buy at a new cached price blends the average.
        {
            let mut s = store.lock().unwrap();
            s.stocks[0].last_price = dec!(70);
        }
        let outcome = svc.execute_buy("u1", order("p1", "AAPL", 10)).await.unwrap();
        assert_eq!(outcome.cash_balance, dec!(8800));
        assert_eq!(outcome.price, dec!(70));
        let position = outcome.position.unwrap();
        assert_eq!(position.quantity, 20);
        assert_eq!(position.average_buy_price, dec!(60));

        // Partial sell executes at a fresh quote, average untouched.
        provider.set_price(dec!(80));
        let outcome = svc.execute_sell("u1", order("p1", "AAPL", 5)).await.unwrap();
        assert_eq!(outcome.cash_balance, dec!(9200));
        assert_eq!(outcome.price, dec!(80));
        let position = outcome.position.unwrap();
        assert_eq!(position.quantity, 15);
        assert_eq!(position.average_buy_price, dec!(60));

        let ledger = store.lock().unwrap().transactions.clone();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger[2].side, TradeSide::Sell);
    }

    #[tokio::test]
    async fn test_buy_rejects_insufficient_funds() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(100));
        seed_stock(&store, "s1", "AAPL", dec!(50));
        let svc = service(&store, StubProvider::quoting(dec!(50)));

        let err = svc
            .execute_buy("u1", order("p1", "AAPL", 3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::InsufficientFunds {
                required,
                available,
            }) if required == dec!(150) && available == dec!(100)
        ));

        // Nothing moved.
        let s = store.lock().unwrap();
        assert_eq!(s.portfolios[0].cash_balance, dec!(100));
        assert!(s.positions.is_empty());
        assert!(s.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_buy_unknown_symbol_blocks_without_quote() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        let svc = service(&store, StubProvider::failing());

        let err = svc
            .execute_buy("u1", order("p1", "NEWCO", 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::QuoteUnavailable { .. })
        ));

        // The placeholder row survives for later retries; no money moved.
        let s = store.lock().unwrap();
        assert_eq!(s.stocks.len(), 1);
        assert_eq!(s.portfolios[0].cash_balance, dec!(10000));
        assert!(s.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_buy_refreshes_stale_placeholder_price() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        seed_stock(&store, "s1", "AAPL", Decimal::ZERO);
        let svc = service(&store, StubProvider::quoting(dec!(25)));

        let outcome = svc.execute_buy("u1", order("p1", "AAPL", 4)).await.unwrap();
        assert_eq!(outcome.price, dec!(25));
        assert_eq!(store.lock().unwrap().stocks[0].last_price, dec!(25));
    }

    #[tokio::test]
    async fn test_buy_blends_average_with_rounding() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        seed_stock(&store, "s1", "AAPL", dec!(10));
        let svc = service(&store, StubProvider::quoting(dec!(10)));

        svc.execute_buy("u1", order("p1", "AAPL", 1)).await.unwrap();
        {
            let mut s = store.lock().unwrap();
            s.stocks[0].last_price = dec!(20);
        }
        let outcome = svc.execute_buy("u1", order("p1", "AAPL", 2)).await.unwrap();

        // (1*10 + 2*20) / 3, rounded to six places.
        let position = outcome.position.unwrap();
        assert_eq!(position.average_buy_price, dec!(16.666667));
    }

    #[tokio::test]
    async fn test_buy_unknown_portfolio() {
        let store = Arc::new(Mutex::new(Store::default()));
        let svc = service(&store, StubProvider::quoting(dec!(50)));

        let err = svc
            .execute_buy("u1", order("missing", "AAPL", 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::PortfolioNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_buy_denies_foreign_portfolio() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        let svc = service(&store, StubProvider::quoting(dec!(50)));

        let err = svc
            .execute_buy("intruder", order("p1", "AAPL", 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::PortfolioNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sell_requires_position() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        seed_stock(&store, "s1", "AAPL", dec!(50));
        let svc = service(&store, StubProvider::quoting(dec!(50)));

        let err = svc
            .execute_sell("u1", order("p1", "AAPL", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Trading(TradingError::NoPosition(_))));
    }

    #[tokio::test]
    async fn test_sell_rejects_oversized_order() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        let provider = StubProvider::quoting(dec!(50));
        let svc = service(&store, provider);
        svc.execute_buy("u1", order("p1", "AAPL", 5)).await.unwrap();

        let err = svc
            .execute_sell("u1", order("p1", "AAPL", 6))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::InsufficientShares {
                requested: 6,
                held: 5,
            })
        ));
    }

    #[tokio::test]
    async fn test_sell_unknown_stock() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        let svc = service(&store, StubProvider::quoting(dec!(50)));

        let err = svc
            .execute_sell("u1", order("p1", "GHOST", 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::StockNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sell_falls_back_to_cached_price() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        let provider = StubProvider::quoting(dec!(40));
        let svc = service(&store, provider.clone());
        svc.execute_buy("u1", order("p1", "AAPL", 10)).await.unwrap();

        // Provider goes dark; the sell still executes at the cached 40.
        *provider.price.lock().unwrap() = None;
        let outcome = svc.execute_sell("u1", order("p1", "AAPL", 4)).await.unwrap();
        assert_eq!(outcome.price, dec!(40));
        assert_eq!(outcome.cash_balance, dec!(9600) + dec!(160));
    }

    #[tokio::test]
    async fn test_sell_everything_removes_position() {
        let store = Arc::new(Mutex::new(Store::default()));
        seed_portfolio(&store, "p1", "u1", dec!(10000));
        let provider = StubProvider::quoting(dec!(50));
        let svc = service(&store, provider);
        svc.execute_buy("u1", order("p1", "AAPL", 10)).await.unwrap();

        let outcome = svc
            .execute_sell("u1", order("p1", "AAPL", 10))
            .await
            .unwrap();
        assert!(outcome.position.is_none());
        assert_eq!(outcome.cash_balance, dec!(10000));
        assert!(store.lock().unwrap().positions.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected_before_any_lookup() {
        let store = Arc::new(Mutex::new(Store::default()));
        let svc = service(&store, StubProvider::quoting(dec!(50)));

        let err = svc
            .execute_buy("u1", order("p1", "AAPL", 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::InvalidQuantity(0))
        ));
    }
}
