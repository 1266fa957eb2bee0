//! Portfolio domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_PORTFOLIO_NAME_LEN;
use crate::{errors::ValidationError, Error, Result};

/// Domain model representing a virtual trading portfolio.
///
/// `cash_balance` is owned by the trade execution engine; nothing else
/// mutates it after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub cash_balance: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub name: String,
    pub description: Option<String>,
    /// Starting cash; falls back to the configured default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_cash: Option<Decimal>,
}

impl NewPortfolio {
    /// Validates the new portfolio data.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if let Some(cash) = self.starting_cash {
            if cash.is_sign_negative() {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Starting cash cannot be negative".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Input model for updating an existing portfolio.
///
/// Cash is deliberately absent: balances move only through trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    pub name: String,
    pub description: Option<String>,
}

impl PortfolioUpdate {
    /// Validates the portfolio update data.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Portfolio name cannot be empty".to_string(),
        )));
    }
    if name.len() > MAX_PORTFOLIO_NAME_LEN {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Portfolio name cannot exceed {} characters",
            MAX_PORTFOLIO_NAME_LEN
        ))));
    }
    Ok(())
}
