//! Quotes module - price resolution against the market data provider.

mod price_resolver;

// Re-export the public interface
pub use price_resolver::{PriceResolver, ResolvedPrice};
