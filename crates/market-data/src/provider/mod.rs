//! Market data provider implementations.

mod finnhub;
mod traits;

pub use finnhub::FinnhubProvider;
pub use traits::MarketDataProvider;
