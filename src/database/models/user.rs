use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub hashed_password: String,
}

/// Column values for inserting or fully replacing a user row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub hashed_password: String,
}

impl User {
    pub fn from_new(id: i32, new: NewUser) -> Self {
        Self {
            id,
            username: new.username,
            hashed_password: new.hashed_password,
        }
    }

    pub fn apply(&mut self, changes: NewUser) {
        self.username = changes.username;
        self.hashed_password = changes.hashed_password;
    }
}
