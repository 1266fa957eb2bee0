//! Stock domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_SYMBOL_LEN;
use crate::{errors::ValidationError, Error, Result};

/// A stock known to the system, with its most recently cached price.
///
/// `last_price` is zero until the first successful quote; `has_price`
/// distinguishes that state from a real quote of zero (providers report
/// unknown symbols as all-zero quotes, which never reach the cache).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: String,
    pub symbol: String,
    pub company_name: String,
    pub last_price: Decimal,
    pub last_updated: NaiveDateTime,
}

impl Stock {
    /// Whether a usable cached price exists.
    pub fn has_price(&self) -> bool {
        !self.last_price.is_zero()
    }
}

/// Normalizes a raw ticker symbol: trims, uppercases, and validates.
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Stock symbol cannot be empty".to_string(),
        )));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Stock symbol cannot exceed {} characters",
            MAX_SYMBOL_LEN
        ))));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Invalid stock symbol: {}",
            symbol
        ))));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("  aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("   ").is_err());
        assert!(normalize_symbol("TOOLONGSYMBOL").is_err());
        assert!(normalize_symbol("AA PL").is_err());
        assert!(normalize_symbol("AAPL$").is_err());
    }

    #[test]
    fn test_has_price() {
        let mut stock = Stock {
            id: "s1".to_string(),
            symbol: "AAPL".to_string(),
            company_name: "Apple Inc".to_string(),
            last_price: Decimal::ZERO,
            last_updated: Utc::now().naive_utc(),
        };
        assert!(!stock.has_price());
        stock.last_price = dec!(189.50);
        assert!(stock.has_price());
    }
}
