use serde::Serialize;

/// One hit from a provider symbol search.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSearchResult {
    /// Symbol usable for quote lookups
    pub symbol: String,

    /// Human-readable description or company name
    pub description: String,

    /// Symbol as displayed by the provider
    pub display_symbol: String,

    /// Security type (e.g. "Common Stock", "ETF")
    pub security_type: String,
}

impl SymbolSearchResult {
    pub fn new(symbol: &str, description: &str, display_symbol: &str, security_type: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            description: description.to_string(),
            display_symbol: display_symbol.to_string(),
            security_type: security_type.to_string(),
        }
    }
}
