use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::database::gateway::{item_not_found, user_not_found, username_taken, Gateway, Session};
use crate::database::manager::DatabaseError;
use crate::database::models::{Item, ItemFields, NewUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    items: BTreeMap<i32, Item>,
    last_user_id: i32,
    last_item_id: i32,
}

impl Tables {
    fn username_in_use(&self, username: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

/// In-process store with the same contract as the Postgres gateway.
/// Ids are assigned sequentially from 1 and never reused.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn session(&self) -> Result<Box<dyn Session>, DatabaseError> {
        Ok(Box::new(MemorySession {
            tables: Arc::clone(&self.tables),
        }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn close(&self) {}
}

pub struct MemorySession {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl Session for MemorySession {
    async fn insert_user(&mut self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.lock().await;
        if tables.username_in_use(&user.username, None) {
            return Err(username_taken());
        }

        tables.last_user_id += 1;
        let record = User::from_new(tables.last_user_id, user);
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_user(&mut self, id: i32) -> Result<User, DatabaseError> {
        let tables = self.tables.lock().await;
        tables.users.get(&id).cloned().ok_or_else(user_not_found)
    }

    async fn list_users(&mut self) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&mut self, id: i32, changes: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&id) {
            return Err(user_not_found());
        }
        if tables.username_in_use(&changes.username, Some(id)) {
            return Err(username_taken());
        }

        let user = tables.users.get_mut(&id).ok_or_else(user_not_found)?;
        user.apply(changes);
        Ok(user.clone())
    }

    async fn delete_user(&mut self, id: i32) -> Result<User, DatabaseError> {
        let mut tables = self.tables.lock().await;
        tables.users.remove(&id).ok_or_else(user_not_found)
    }

    async fn insert_item(&mut self, fields: ItemFields) -> Result<Item, DatabaseError> {
        let mut tables = self.tables.lock().await;
        tables.last_item_id += 1;
        let item = Item::from_fields(tables.last_item_id, fields);
        tables.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_item(&mut self, id: i32) -> Result<Item, DatabaseError> {
        let tables = self.tables.lock().await;
        tables.items.get(&id).cloned().ok_or_else(item_not_found)
    }

    async fn list_items(&mut self) -> Result<Vec<Item>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables.items.values().cloned().collect())
    }

    async fn update_item(&mut self, id: i32, fields: ItemFields) -> Result<Item, DatabaseError> {
        let mut tables = self.tables.lock().await;
        let item = tables.items.get_mut(&id).ok_or_else(item_not_found)?;
        item.apply(fields);
        Ok(item.clone())
    }

    async fn delete_item(&mut self, id: i32) -> Result<Item, DatabaseError> {
        let mut tables = self.tables.lock().await;
        tables.items.remove(&id).ok_or_else(item_not_found)
    }
}
