use async_trait::async_trait;
use papertrade_market_data::SymbolSearchResult;
use rust_decimal::Decimal;

use crate::Result;

use super::Stock;

/// Trait for stock repository operations.
#[async_trait]
pub trait StockRepositoryTrait: Send + Sync {
    fn get_by_id(&self, stock_id: &str) -> Result<Stock>;
    fn get_by_symbol(&self, symbol: &str) -> Result<Stock>;
    fn list(&self, query: Option<&str>) -> Result<Vec<Stock>>;
    async fn create(&self, symbol: &str, company_name: &str, price: Decimal) -> Result<Stock>;

    /// Returns the stock row for `symbol`, creating a placeholder when absent.
    /// The boolean reports whether a new row was created.
    async fn get_or_create(&self, symbol: &str) -> Result<(Stock, bool)>;

    /// Persists a freshly fetched price (and optionally a company name).
    async fn update_market_data(
        &self,
        stock_id: &str,
        price: Decimal,
        company_name: Option<String>,
    ) -> Result<Stock>;
}

/// Trait defining the contract for stock services.
#[async_trait]
pub trait StockServiceTrait: Send + Sync {
    fn get_stock(&self, symbol: &str) -> Result<Stock>;
    fn list_stocks(&self, query: Option<&str>) -> Result<Vec<Stock>>;

    /// Looks up a symbol, pulling it from the quote provider on a cache miss.
    async fn search(&self, symbol: &str) -> Result<Stock>;

    /// Forces a quote refresh for an already known symbol.
    async fn refresh_price(&self, symbol: &str) -> Result<Stock>;

    /// Free-text symbol search against the quote provider.
    async fn lookup_symbols(&self, query: &str) -> Result<Vec<SymbolSearchResult>>;
}
