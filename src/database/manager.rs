use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation, carrying the store's own message. Rendered as a
    /// 500 to keep the status existing clients already handle.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    pub fn not_found(entity: &str) -> Self {
        DatabaseError::NotFound(format!("{entity} not found"))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return DatabaseError::Conflict(db.message().to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Owns pool construction and schema setup for the Postgres backend
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::build_connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!(host = %config.host, database = %config.name, "Created database pool");
        Ok(pool)
    }

    /// `DATABASE_URL` wins; otherwise the URL is assembled from the discrete
    /// host/port/user/password/name settings.
    fn build_connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        if let Some(url) = &config.url {
            let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
            return Ok(parsed.into());
        }

        if config.host.is_empty() {
            return Err(DatabaseError::ConfigMissing("DB_HOST"));
        }
        if config.name.is_empty() {
            return Err(DatabaseError::ConfigMissing("DB_NAME"));
        }

        let mut url = url::Url::parse("postgres://localhost").map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_host(Some(&config.host)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_port(Some(config.port)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_username(&config.user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !config.password.is_empty() {
            url.set_password(Some(&config.password)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        url.set_path(&format!("/{}", config.name));
        url.set_query(Some("sslmode=disable"));
        Ok(url.into())
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
