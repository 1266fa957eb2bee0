use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One observation of a symbol's price.
///
/// Only `price` is guaranteed; the day's open/high/low come along when
/// the provider reports them and stay off the wire when absent.
#[derive(Clone, Debug, Serialize)]
pub struct Quote {
    /// Last traded price.
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,
    /// Moment the price was observed, per the provider.
    pub timestamp: DateTime<Utc>,
    /// Provider id the quote came from, e.g. "FINNHUB".
    pub source: String,
}

impl Quote {
    /// Quote carrying only a price, for providers and stubs with no
    /// intraday range to report.
    pub fn new(timestamp: DateTime<Utc>, price: Decimal, source: String) -> Self {
        Self {
            price,
            open: None,
            high: None,
            low: None,
            timestamp,
            source,
        }
    }
}
