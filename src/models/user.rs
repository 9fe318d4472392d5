use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A user row as stored in the `users` table. `password` holds a bcrypt hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password: String,
}

/// A user as returned by the API. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
}

/// Payload for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
        }
    }
}
