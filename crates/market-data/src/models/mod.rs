//! Data models shared by market data providers.

mod profile;
mod quote;
mod search;

pub use profile::CompanyProfile;
pub use quote::Quote;
pub use search::SymbolSearchResult;
