use chrono::NaiveDateTime;
use diesel::prelude::*;

use papertrade_core::users::{NewUser, User};

/// Row in the `users` table.
#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserDB> for User {
    fn from(row: UserDB) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Assigns the id and timestamps at insert time.
impl From<NewUser> for UserDB {
    fn from(new_user: NewUser) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
