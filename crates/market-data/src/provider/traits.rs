use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, Quote, SymbolSearchResult};

/// A source of quotes, profiles and symbol search.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Stable identifier, e.g. "FINNHUB". Shows up in logs and in the
    /// `source` field of every quote the provider hands out.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Fetch the company profile for a symbol.
    async fn get_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError>;

    /// Search for symbols matching a free-text query.
    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>, MarketDataError>;
}
