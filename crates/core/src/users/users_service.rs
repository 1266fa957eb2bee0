use log::debug;
use std::sync::Arc;

use super::users_model::{NewUser, User};
use super::users_traits::{UserRepositoryTrait, UserServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::Error;

/// Service for managing users.
pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    /// Creates a new UserService instance
    pub fn new(repository: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl UserServiceTrait for UserService {
    async fn register(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;
        debug!("Registering user '{}'", new_user.username);

        self.repository.create(new_user).await.map_err(|e| {
            if e.is_unique_violation() {
                Error::Validation(ValidationError::InvalidInput(
                    "Username is already taken".to_string(),
                ))
            } else {
                e
            }
        })
    }

    fn get_user(&self, user_id: &str) -> Result<User> {
        self.repository.get_by_id(user_id)
    }

    fn get_by_username(&self, username: &str) -> Result<User> {
        self.repository.get_by_username(username)
    }
}
