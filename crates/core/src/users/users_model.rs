//! User domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_USERNAME_LEN, MIN_USERNAME_LEN};
use crate::{errors::ValidationError, Error, Result};

/// Domain model representing a registered user.
///
/// The password hash never leaves the backend; it is skipped on
/// serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new user.
///
/// The caller is responsible for hashing the password; the core never
/// sees plaintext credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

impl NewUser {
    /// Validates the new user data.
    pub fn validate(&self) -> Result<()> {
        let username = self.username.trim();
        if username.len() < MIN_USERNAME_LEN || username.len() > MAX_USERNAME_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Username must be between {} and {} characters",
                MIN_USERNAME_LEN, MAX_USERNAME_LEN
            ))));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Username may only contain letters, digits, '_', '-' and '.'".to_string(),
            )));
        }
        if self.password_hash.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "passwordHash".to_string(),
            )));
        }
        Ok(())
    }
}
