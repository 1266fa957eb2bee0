//! Live quotes, company profiles and symbol search for the trading
//! service.
//!
//! The trading core talks to the [`MarketDataProvider`] trait and
//! nothing else, so quote sources are swappable; [`FinnhubProvider`] is
//! the one real implementation, and tests substitute in-memory stubs.

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use models::{CompanyProfile, Quote, SymbolSearchResult};
pub use provider::{FinnhubProvider, MarketDataProvider};
