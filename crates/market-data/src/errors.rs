//! Failure modes of quote providers.

use thiserror::Error;

/// What went wrong while talking to a quote provider.
///
/// [`SymbolNotFound`](Self::SymbolNotFound) is the one variant callers
/// branch on: it means the symbol itself is bad and retrying is
/// pointless, while every other variant leaves the symbol in doubt.
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// HTTP 429, or 403 for providers that report quota exhaustion
    /// that way.
    #[error("Rate limited: {provider}")]
    RateLimited { provider: String },

    #[error("Timeout: {provider}")]
    Timeout { provider: String },

    /// Catch-all for provider-side trouble: bad API key, malformed
    /// payload, unexpected status.
    #[error("Provider error: {provider} - {message}")]
    ProviderError { provider: String, message: String },

    /// The payload parsed but carried values we refuse to use.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// True when the symbol itself is unknown, as opposed to the
    /// provider being temporarily unreachable.
    pub fn is_symbol_not_found(&self) -> bool {
        matches!(self, Self::SymbolNotFound(_))
    }
}
