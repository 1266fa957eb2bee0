//! Error taxonomy shared across the workspace.
//!
//! Storage failures are stringified into [`DatabaseError`] before they
//! reach this crate, so core stays free of Diesel types.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use rust_decimal::Decimal;
use thiserror::Error;

use papertrade_market_data::MarketDataError;

pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the trading application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    // Trading errors render bare; their messages are user-facing.
    #[error("{0}")]
    Trading(#[from] TradingError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Snapshot already exists for portfolio {portfolio_id} on {date}")]
    DuplicateSnapshot {
        portfolio_id: String,
        date: NaiveDate,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True for a storage-level "record not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::NotFound(_)))
    }

    /// True for a storage-level unique constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::UniqueViolation(_)))
    }
}

/// Errors raised by the trade execution engine.
///
/// Every variant is a rejected precondition; none of them leaves partial
/// state behind. The messages are user-facing.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    #[error("Portfolio {0} not found or access denied")]
    PortfolioNotFound(String),

    #[error("Stock with symbol {0} not found")]
    StockNotFound(String),

    #[error("No open position for {0}")]
    NoPosition(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Not enough shares to sell: requested {requested}, held {held}")]
    InsufficientShares { requested: i64, held: i64 },

    #[error("Could not retrieve a quote for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },
}

/// Storage failures in backend-neutral form.
///
/// The API layer gives `NotFound` and `UniqueViolation` dedicated
/// status codes; everything else reads as an internal fault.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// Shortcut conversions so `?` works on raw parse and IO results without
// naming the intermediate ValidationError.

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trading_error_messages() {
        let err = TradingError::InsufficientFunds {
            required: dec!(500.00),
            available: dec!(123.45),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: required 500.00, available 123.45"
        );

        let err = TradingError::InsufficientShares {
            requested: 10,
            held: 4,
        };
        assert_eq!(
            err.to_string(),
            "Not enough shares to sell: requested 10, held 4"
        );
    }

    #[test]
    fn test_trading_errors_render_without_prefix() {
        let err = Error::Trading(TradingError::InvalidQuantity(0));
        assert_eq!(err.to_string(), "Quantity must be at least 1, got 0");
    }

    #[test]
    fn test_not_found_classification() {
        let err = Error::Database(DatabaseError::NotFound("portfolio".to_string()));
        assert!(err.is_not_found());
        assert!(!err.is_unique_violation());

        let err = Error::Database(DatabaseError::UniqueViolation("snapshot".to_string()));
        assert!(err.is_unique_violation());
    }
}
