/// Decimal precision for stored monetary values
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Cash balance a new portfolio starts with, unless overridden
pub const DEFAULT_STARTING_CASH: &str = "10000.00";

/// Longest symbol accepted from user input
pub const MAX_SYMBOL_LEN: usize = 10;

/// Longest portfolio name accepted
pub const MAX_PORTFOLIO_NAME_LEN: usize = 100;

/// Username length bounds
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LEN: usize = 8;

/// Default page size for transaction history listings
pub const DEFAULT_PAGE_SIZE: i64 = 50;
