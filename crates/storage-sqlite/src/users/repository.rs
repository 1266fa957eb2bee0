use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::users;
use crate::schema::users::dsl::*;

use super::model::UserDB;
use papertrade_core::users::{NewUser, User, UserRepositoryTrait};
use papertrade_core::Result;

/// Repository for managing user records in the database
pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    /// Creates a new UserRepository instance
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        self.writer
            .exec(move |conn| {
                let user_db: UserDB = new_user.into();

                diesel::insert_into(users::table)
                    .values(&user_db)
                    .execute(conn)
                    .into_core()?;

                Ok(user_db.into())
            })
            .await
    }

    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;

        let user = users
            .select(UserDB::as_select())
            .find(user_id)
            .first::<UserDB>(&mut conn)
            .into_core()?;

        Ok(user.into())
    }

    fn get_by_username(&self, username_param: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;

        let user = users
            .select(UserDB::as_select())
            .filter(username.eq(username_param))
            .first::<UserDB>(&mut conn)
            .into_core()?;

        Ok(user.into())
    }
}
