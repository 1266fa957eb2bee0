//! Quote source backed by the Finnhub REST API.
//!
//! Three endpoints are used: `/quote` for the latest trade, `/search`
//! for symbol lookup and `/stock/profile2` for company metadata. The
//! free tier allows 60 requests per minute, and Finnhub signals an
//! exhausted quota with HTTP 403 rather than 429, so both map to
//! [`MarketDataError::RateLimited`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, Quote, SymbolSearchResult};
use crate::provider::MarketDataProvider;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Finnhub REST API.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }

    fn provider_error(message: impl Into<String>) -> MarketDataError {
        MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: message.into(),
        }
    }

    /// GET `path` with the API key header and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MarketDataError> {
        let response = self
            .client
            .get(format!("{BASE_URL}{path}"))
            .header("X-Finnhub-Token", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    Self::provider_error(format!("request failed: {e}"))
                }
            })?;

        match response.status() {
            // 403 is how Finnhub reports an exhausted quota.
            StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN => {
                Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                })
            }
            StatusCode::UNAUTHORIZED => Err(Self::provider_error("invalid or missing API key")),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                let detail = serde_json::from_str::<ApiError>(&body)
                    .ok()
                    .and_then(|e| e.error)
                    .unwrap_or_else(|| format!("HTTP {status} - {body}"));
                Err(Self::provider_error(detail))
            }
            _ => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| Self::provider_error(format!("failed to read response: {e}")))?;
                serde_json::from_str(&body)
                    .map_err(|e| Self::provider_error(format!("failed to decode response: {e}")))
            }
        }
    }
}

/// Body of `/quote`. Finnhub omits fields rather than erroring, so
/// everything is optional.
#[derive(Debug, Deserialize)]
struct QuoteWire {
    /// Last traded price
    c: Option<f64>,
    /// Day high
    h: Option<f64>,
    /// Day low
    l: Option<f64>,
    /// Day open
    o: Option<f64>,
    /// Unix timestamp of the last trade
    t: Option<i64>,
}

impl QuoteWire {
    /// Convert to a domain [`Quote`]. Finnhub answers 200 with an
    /// all-zero payload for symbols it does not know, which must read
    /// as "unknown symbol" rather than a free stock.
    fn into_quote(self, symbol: &str) -> Result<Quote, MarketDataError> {
        let last = self.c.ok_or_else(|| {
            MarketDataError::SymbolNotFound(format!("no quote data for {symbol}"))
        })?;

        if last == 0.0 && self.o.unwrap_or(0.0) == 0.0 {
            return Err(MarketDataError::SymbolNotFound(format!(
                "no trades reported for {symbol}"
            )));
        }

        let price = Decimal::try_from(last).map_err(|_| MarketDataError::ValidationFailed {
            message: format!("unrepresentable price: {last}"),
        })?;

        let timestamp = self
            .t
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(Quote {
            timestamp,
            open: self.o.and_then(|v| Decimal::try_from(v).ok()),
            high: self.h.and_then(|v| Decimal::try_from(v).ok()),
            low: self.l.and_then(|v| Decimal::try_from(v).ok()),
            price,
            source: PROVIDER_ID.to_string(),
        })
    }
}

/// Body of `/stock/profile2`. An unknown symbol comes back as a bare
/// `{}`, which decodes to a value with every field unset.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileWire {
    name: Option<String>,
    ticker: Option<String>,
    exchange: Option<String>,
    finnhub_industry: Option<String>,
    country: Option<String>,
    weburl: Option<String>,
}

impl ProfileWire {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.ticker.is_none()
    }
}

impl From<ProfileWire> for CompanyProfile {
    fn from(wire: ProfileWire) -> Self {
        CompanyProfile {
            name: wire.name,
            ticker: wire.ticker,
            exchange: wire.exchange,
            industry: wire.finnhub_industry,
            country: wire.country,
            website: wire.weburl,
        }
    }
}

/// Body of `/search`.
#[derive(Debug, Deserialize)]
struct SearchWire {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    description: String,
    display_symbol: String,
    symbol: String,
    #[serde(rename = "type")]
    security_type: String,
}

/// Error body Finnhub attaches to some non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: Option<String>,
}

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        debug!(symbol, "fetching quote from Finnhub");
        let wire: QuoteWire = self.get_json("/quote", &[("symbol", symbol)]).await?;
        wire.into_quote(symbol)
    }

    async fn get_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        debug!(symbol, "fetching company profile from Finnhub");
        let wire: ProfileWire = self
            .get_json("/stock/profile2", &[("symbol", symbol)])
            .await?;
        if wire.is_empty() {
            return Err(MarketDataError::SymbolNotFound(format!(
                "no profile data for {symbol}"
            )));
        }
        Ok(wire.into())
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>, MarketDataError> {
        let wire: SearchWire = self.get_json("/search", &[("q", query)]).await?;
        let hits = wire
            .result
            .into_iter()
            .map(|hit| {
                SymbolSearchResult::new(
                    &hit.symbol,
                    &hit.description,
                    &hit.display_symbol,
                    &hit.security_type,
                )
            })
            .collect::<Vec<_>>();
        debug!(query, hits = hits.len(), "Finnhub search finished");
        Ok(hits)
    }
}
