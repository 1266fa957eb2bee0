use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use papertrade_market_data::{MarketDataProvider, SymbolSearchResult};

use crate::errors::TradingError;
use crate::{Error, Result};

use super::{normalize_symbol, Stock, StockRepositoryTrait, StockServiceTrait};

/// Service for managing stocks and their cached market data.
pub struct StockService {
    repository: Arc<dyn StockRepositoryTrait>,
    provider: Arc<dyn MarketDataProvider>,
}

impl StockService {
    pub fn new(
        repository: Arc<dyn StockRepositoryTrait>,
        provider: Arc<dyn MarketDataProvider>,
    ) -> Self {
        Self {
            repository,
            provider,
        }
    }

    fn stock_not_found(symbol: &str) -> Error {
        Error::Trading(TradingError::StockNotFound(symbol.to_string()))
    }
}

#[async_trait]
impl StockServiceTrait for StockService {
    fn get_stock(&self, symbol: &str) -> Result<Stock> {
        let symbol = normalize_symbol(symbol)?;
        self.repository.get_by_symbol(&symbol).map_err(|e| {
            if e.is_not_found() {
                Self::stock_not_found(&symbol)
            } else {
                e
            }
        })
    }

    fn list_stocks(&self, query: Option<&str>) -> Result<Vec<Stock>> {
        self.repository.list(query)
    }

    async fn search(&self, symbol: &str) -> Result<Stock> {
        let symbol = normalize_symbol(symbol)?;

        match self.repository.get_by_symbol(&symbol) {
            Ok(stock) => {
                // Known symbol: refresh opportunistically, keep the cached
                // row when the provider is unavailable.
                match self.provider.get_quote(&symbol).await {
                    Ok(quote) => {
                        self.repository
                            .update_market_data(&stock.id, quote.price, None)
                            .await
                    }
                    Err(e) => {
                        warn!("Price refresh failed for {}: {}", symbol, e);
                        Ok(stock)
                    }
                }
            }
            Err(e) if e.is_not_found() => {
                // Unknown symbol: only admit it once the provider returns
                // both a price and a named profile.
                let quote = self
                    .provider
                    .get_quote(&symbol)
                    .await
                    .map_err(|_| Self::stock_not_found(&symbol))?;
                let profile = self
                    .provider
                    .get_profile(&symbol)
                    .await
                    .map_err(|_| Self::stock_not_found(&symbol))?;
                let company_name = profile
                    .name
                    .ok_or_else(|| Self::stock_not_found(&symbol))?;
                self.repository
                    .create(&symbol, &company_name, quote.price)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh_price(&self, symbol: &str) -> Result<Stock> {
        let symbol = normalize_symbol(symbol)?;
        let stock = self.repository.get_by_symbol(&symbol).map_err(|e| {
            if e.is_not_found() {
                Self::stock_not_found(&symbol)
            } else {
                e
            }
        })?;

        let quote = self.provider.get_quote(&symbol).await.map_err(|e| {
            Error::Trading(TradingError::QuoteUnavailable {
                symbol: symbol.clone(),
                reason: e.to_string(),
            })
        })?;

        self.repository
            .update_market_data(&stock.id, quote.price, None)
            .await
    }

    async fn lookup_symbols(&self, query: &str) -> Result<Vec<SymbolSearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation(
                crate::errors::ValidationError::InvalidInput(
                    "Search query cannot be empty".to_string(),
                ),
            ));
        }
        Ok(self.provider.search(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DatabaseError;
    use chrono::Utc;
    use papertrade_market_data::{CompanyProfile, MarketDataError, Quote};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct MockStockRepository {
        stocks: Mutex<Vec<Stock>>,
    }

    impl MockStockRepository {
        fn new(stocks: Vec<Stock>) -> Self {
            Self {
                stocks: Mutex::new(stocks),
            }
        }
    }

    fn sample_stock(symbol: &str, price: Decimal) -> Stock {
        Stock {
            id: format!("stock-{}", symbol),
            symbol: symbol.to_string(),
            company_name: format!("{} Inc", symbol),
            last_price: price,
            last_updated: Utc::now().naive_utc(),
        }
    }

    #[async_trait]
    impl StockRepositoryTrait for MockStockRepository {
        fn get_by_id(&self, stock_id: &str) -> Result<Stock> {
            self.stocks
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == stock_id)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))
        }

        fn get_by_symbol(&self, symbol: &str) -> Result<Stock> {
            self.stocks
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.symbol == symbol)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound("row".to_string())))
        }

        fn list(&self, query: Option<&str>) -> Result<Vec<Stock>> {
            let stocks = self.stocks.lock().unwrap();
            Ok(match query {
                Some(q) => stocks
                    .iter()
                    .filter(|s| s.symbol.contains(&q.to_uppercase()))
                    .cloned()
                    .collect(),
                None => stocks.clone(),
            })
        }

        async fn create(
            &self,
            symbol: &str,
            company_name: &str,
            price: Decimal,
        ) -> Result<Stock> {
            let mut stock = sample_stock(symbol, price);
            stock.company_name = company_name.to_string();
            self.stocks.lock().unwrap().push(stock.clone());
            Ok(stock)
        }

        async fn get_or_create(&self, symbol: &str) -> Result<(Stock, bool)> {
            if let Ok(existing) = self.get_by_symbol(symbol) {
                return Ok((existing, false));
            }
            let stock = sample_stock(symbol, Decimal::ZERO);
            self.stocks.lock().unwrap().push(stock.clone());
            Ok((stock, true))
        }

        async fn update_market_data(
            &self,
            stock_id: &str,
            price: Decimal,
            company_name: Option<String>,
        ) -> Result<Stock> {
            let mut stocks = self.stocks.lock().unwrap();
            let stock = stocks
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

    struct StubProvider {
        quote: Option<Decimal>,
        profile_name: Option<String>,
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        fn id(&self) -> &'static str {
            "STUB"
        }

        async fn get_quote(&self, symbol: &str) -> std::result::Result<Quote, MarketDataError> {
            match self.quote {
                Some(price) => Ok(Quote::new(chrono::Utc::now(), price, "STUB".to_string())),
                None => Err(MarketDataError::SymbolNotFound(symbol.to_string())),
            }
        }

        async fn get_profile(
            &self,
            symbol: &str,
        ) -> std::result::Result<CompanyProfile, MarketDataError> {
            match &self.profile_name {
                Some(name) => Ok(CompanyProfile {
                    name: Some(name.clone()),
                    ticker: Some(symbol.to_string()),
                    exchange: None,
                    industry: None,
                    country: None,
                    website: None,
                }),
                None => Err(MarketDataError::SymbolNotFound(symbol.to_string())),
            }
        }

        async fn search(
            &self,
            _query: &str,
        ) -> std::result::Result<Vec<SymbolSearchResult>, MarketDataError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_search_refreshes_known_symbol() {
        let repo = Arc::new(MockStockRepository::new(vec![sample_stock(
            "AAPL",
            dec!(100),
        )]));
        let provider = Arc::new(StubProvider {
            quote: Some(dec!(120)),
            profile_name: None,
        });
        let service = StockService::new(repo, provider);

        let stock = service.search("aapl").await.unwrap();
        assert_eq!(stock.last_price, dec!(120));
    }

    #[tokio::test]
    async fn test_search_keeps_cached_price_when_provider_down() {
        let repo = Arc::new(MockStockRepository::new(vec![sample_stock(
            "AAPL",
            dec!(100),
        )]));
        let provider = Arc::new(StubProvider {
            quote: None,
            profile_name: None,
        });
        let service = StockService::new(repo, provider);

        let stock = service.search("AAPL").await.unwrap();
        assert_eq!(stock.last_price, dec!(100));
    }

    #[tokio::test]
    async fn test_search_creates_unknown_symbol_with_profile_name() {
        let repo = Arc::new(MockStockRepository::new(vec![]));
        let provider = Arc::new(StubProvider {
            quote: Some(dec!(45.50)),
            profile_name: Some("Tesla Inc".to_string()),
        });
        let service = StockService::new(repo, provider);

        let stock = service.search("TSLA").await.unwrap();
        assert_eq!(stock.symbol, "TSLA");
        assert_eq!(stock.company_name, "Tesla Inc");
        assert_eq!(stock.last_price, dec!(45.50));
    }

    #[tokio::test]
    async fn test_search_unknown_symbol_without_profile_fails() {
        let repo = Arc::new(MockStockRepository::new(vec![]));
        let provider = Arc::new(StubProvider {
            quote: Some(dec!(45.50)),
            profile_name: None,
        });
        let service = StockService::new(repo, provider);

        let err = service.search("TSLA").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::StockNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search_unknown_symbol_without_quote_fails() {
        let repo = Arc::new(MockStockRepository::new(vec![]));
        let provider = Arc::new(StubProvider {
            quote: None,
            profile_name: None,
        });
        let service = StockService::new(repo, provider);

        let err = service.search("NOPE").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::StockNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_price_requires_known_stock() {
        let repo = Arc::new(MockStockRepository::new(vec![]));
        let provider = Arc::new(StubProvider {
            quote: Some(dec!(10)),
            profile_name: None,
        });
        let service = StockService::new(repo, provider);

        let err = service.refresh_price("AAPL").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::StockNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_price_maps_provider_failure() {
        let repo = Arc::new(MockStockRepository::new(vec![sample_stock(
            "AAPL",
            dec!(100),
        )]));
        let provider = Arc::new(StubProvider {
            quote: None,
            profile_name: None,
        });
        let service = StockService::new(repo, provider);

        let err = service.refresh_price("AAPL").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Trading(TradingError::QuoteUnavailable { .. })
        ));
    }
}
