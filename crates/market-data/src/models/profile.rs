use serde::Serialize;

/// Company metadata sourced from a provider's profile endpoint.
///
/// Everything is optional; providers return whatever subset they have.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Company name
    pub name: Option<String>,

    /// Stock ticker as the provider knows it
    pub ticker: Option<String>,

    /// Exchange listing
    pub exchange: Option<String>,

    /// Industry classification
    pub industry: Option<String>,

    /// Country of incorporation
    pub country: Option<String>,

    /// Company website
    pub website: Option<String>,
}
