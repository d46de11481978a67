use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::gateway::Gateway;
use crate::database::memory::MemoryGateway;
use crate::database::postgres::PgGateway;

/// Errors from the persistence gateway
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Which store a connection string selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Postgres(String),
}

impl StoreKind {
    pub fn parse(connection_string: &str) -> Result<Self, DatabaseError> {
        let url = url::Url::parse(connection_string).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        match url.scheme() {
            "memory" => Ok(StoreKind::Memory),
            "postgres" | "postgresql" => Ok(StoreKind::Postgres(connection_string.to_string())),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }
}

/// Connection string with the password removed, for logs
pub fn redact_url(connection_string: &str) -> String {
    match url::Url::parse(connection_string) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.into()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

/// Builds the gateway selected by the configured connection string.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Gateway>, DatabaseError> {
    let connection_string = config
        .url
        .as_deref()
        .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

    match StoreKind::parse(connection_string)? {
        StoreKind::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryGateway::new()))
        }
        StoreKind::Postgres(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(config.connection_timeout))
                .connect(&url)
                .await?;

            info!("Created database pool for: {}", redact_url(&url));

            let gateway = PgGateway::new(pool);
            gateway.migrate().await?;
            Ok(Arc::new(gateway))
        }
    }
}
