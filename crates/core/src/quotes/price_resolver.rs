//! Decides which price a trade executes at.

use std::sync::Arc;

use log::warn;
use papertrade_market_data::MarketDataProvider;
use rust_decimal::Decimal;

use crate::errors::TradingError;
use crate::stocks::Stock;
use crate::{Error, Result};

/// Outcome of price resolution for one stock.
#[derive(Debug, Clone)]
pub struct ResolvedPrice {
    pub price: Decimal,
    /// Set when the resolver fetched a profile to name a placeholder row.
    pub company_name: Option<String>,
    /// Whether the provider was consulted, as opposed to serving the cache.
    pub refreshed: bool,
}

/// Resolves execution prices, consulting the provider only when the
/// cached price cannot be trusted or a refresh is forced.
pub struct PriceResolver {
    provider: Arc<dyn MarketDataProvider>,
}

impl PriceResolver {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a price for `stock`.
    ///
    /// With `force` unset a usable cached price wins. Otherwise the
    /// provider is queried; failure surfaces as `QuoteUnavailable` and
    /// callers decide whether that blocks the trade.
    pub async fn resolve(&self, stock: &Stock, force: bool) -> Result<ResolvedPrice> {
        if !force && stock.has_price() {
            return Ok(ResolvedPrice {
                price: stock.last_price,
                company_name: None,
                refreshed: false,
            });
        }

        let quote = self.provider.get_quote(&stock.symbol).await.map_err(|e| {
            Error::Trading(TradingError::QuoteUnavailable {
                symbol: stock.symbol.clone(),
                reason: e.to_string(),
            })
        })?;

        // Placeholder rows carry no company name yet; fill it in while
        // we are already talking to the provider.
        let company_name = if stock.company_name.is_empty() {
            Some(match self.provider.get_profile(&stock.symbol).await {
                Ok(profile) => profile.name.unwrap_or_else(|| stock.symbol.clone()),
                Err(e) => {
                    warn!("Profile lookup failed for {}: {}", stock.symbol, e);
                    stock.symbol.clone()
                }
            })
        } else {
            None
        };

        Ok(ResolvedPrice {
            price: quote.price,
            company_name,
            refreshed: true,
        })
    }
}
