use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Item, ItemFields, NewUser, User};

/// Source of per-request sessions against the backing store.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Opens a session scoped to one request. Dropping it releases the connection.
    async fn session(&self) -> Result<Box<dyn Session>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn close(&self);
}

/// CRUD primitives over users and items.
///
/// `get_*`, `update_*` and `delete_*` fail with [`DatabaseError::NotFound`] when
/// the row is absent. Writes return the affected record.
#[async_trait]
pub trait Session: Send {
    async fn insert_user(&mut self, user: NewUser) -> Result<User, DatabaseError>;
    async fn get_user(&mut self, id: i32) -> Result<User, DatabaseError>;
    async fn list_users(&mut self) -> Result<Vec<User>, DatabaseError>;
    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn update_user(&mut self, id: i32, changes: NewUser) -> Result<User, DatabaseError>;
    async fn delete_user(&mut self, id: i32) -> Result<User, DatabaseError>;

    async fn insert_item(&mut self, fields: ItemFields) -> Result<Item, DatabaseError>;
    async fn get_item(&mut self, id: i32) -> Result<Item, DatabaseError>;
    async fn list_items(&mut self) -> Result<Vec<Item>, DatabaseError>;
    async fn update_item(&mut self, id: i32, fields: ItemFields) -> Result<Item, DatabaseError>;
    async fn delete_item(&mut self, id: i32) -> Result<Item, DatabaseError>;
}

pub(crate) fn user_not_found() -> DatabaseError {
    DatabaseError::NotFound("User not found".to_string())
}

pub(crate) fn item_not_found() -> DatabaseError {
    DatabaseError::NotFound("Item not found".to_string())
}

pub(crate) fn username_taken() -> DatabaseError {
    DatabaseError::Conflict("Username already registered".to_string())
}
