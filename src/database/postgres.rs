use async_trait::async_trait;
use once_cell::sync::Lazy;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

use crate::database::gateway::{item_not_found, user_not_found, username_taken, Gateway, Session};
use crate::database::manager::DatabaseError;
use crate::database::models::{Item, ItemFields, NewUser, User};

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        hashed_password TEXT NOT NULL
    )
"#;

const CREATE_ITEMS: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        price DOUBLE PRECISION NOT NULL
    )
"#;

// UPDATE items SET name = $1, description = $2, ... WHERE id = $5
static UPDATE_ITEM: Lazy<String> = Lazy::new(|| {
    let assignments = ItemFields::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE items SET {} WHERE id = ${} RETURNING id, name, description, quantity, price",
        assignments,
        ItemFields::COLUMNS.len() + 1
    )
});

/// Postgres-backed gateway; sessions are pooled connections.
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        for statement in [CREATE_USERS, CREATE_ITEMS] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn session(&self) -> Result<Box<dyn Session>, DatabaseError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSession { conn }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Closed database pool");
    }
}

pub struct PgSession {
    conn: PoolConnection<Postgres>,
}

fn map_unique_violation(err: sqlx::Error) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => username_taken(),
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl Session for PgSession {
    async fn insert_user(&mut self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, hashed_password) VALUES ($1, $2)
             RETURNING id, username, hashed_password",
        )
        .bind(&user.username)
        .bind(&user.hashed_password)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(map_unique_violation)
    }

    async fn get_user(&mut self, id: i32) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT id, username, hashed_password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(user_not_found)
    }

    async fn list_users(&mut self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>("SELECT id, username, hashed_password FROM users ORDER BY id")
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(users)
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, hashed_password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(user)
    }

    async fn update_user(&mut self, id: i32, changes: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET username = $1, hashed_password = $2 WHERE id = $3
             RETURNING id, username, hashed_password",
        )
        .bind(&changes.username)
        .bind(&changes.hashed_password)
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(map_unique_violation)?
        .ok_or_else(user_not_found)
    }

    async fn delete_user(&mut self, id: i32) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "DELETE FROM users WHERE id = $1 RETURNING id, username, hashed_password",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(user_not_found)
    }

    async fn insert_item(&mut self, fields: ItemFields) -> Result<Item, DatabaseError> {
        let item = sqlx::query_as::<_, Item>(
            "INSERT INTO items (name, description, quantity, price) VALUES ($1, $2, $3, $4)
             RETURNING id, name, description, quantity, price",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.quantity)
        .bind(fields.price)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(item)
    }

    async fn get_item(&mut self, id: i32) -> Result<Item, DatabaseError> {
        sqlx::query_as::<_, Item>(
            "SELECT id, name, description, quantity, price FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(item_not_found)
    }

    async fn list_items(&mut self) -> Result<Vec<Item>, DatabaseError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, description, quantity, price FROM items ORDER BY id",
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(items)
    }

    async fn update_item(&mut self, id: i32, fields: ItemFields) -> Result<Item, DatabaseError> {
        // Bind order follows ItemFields::COLUMNS
        sqlx::query_as::<_, Item>(UPDATE_ITEM.as_str())
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.quantity)
            .bind(fields.price)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(item_not_found)
    }

    async fn delete_item(&mut self, id: i32) -> Result<Item, DatabaseError> {
        sqlx::query_as::<_, Item>(
            "DELETE FROM items WHERE id = $1 RETURNING id, name, description, quantity, price",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(item_not_found)
    }
}
