//! Database primitives shared by the server binary and the tests.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;

/// Shared sea-orm connection handle; cheap to clone across requests.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing; set {0}")]
    MissingUrl(&'static str),
    #[error(transparent)]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

const URL_ENV: &str = "DATABASE_URL";
const MAX_CONNECTIONS_ENV: &str = "DATABASE_MAX_CONNECTIONS";

/// Environment-driven connection settings.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn from_env() -> DbResult<Self> {
        let url = std::env::var(URL_ENV).map_err(|_| DbError::MissingUrl(URL_ENV))?;
        let max_connections = std::env::var(MAX_CONNECTIONS_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(10);
        Ok(Self {
            url,
            max_connections,
        })
    }
}

pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Ok(Database::connect(options).await?)
}
