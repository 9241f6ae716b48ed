use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Full connection URL; wins over the individual parts when set
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_list_limit: i64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub password_hash_memory_kib: u32,
    pub password_hash_iterations: u32,
}

impl SecurityConfig {
    /// Ten years
    pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_SECRET must be set outside development")]
    MissingSecret,

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("API_MAX_LIST_LIMIT must be positive")]
    InvalidListLimit,

    #[error("SECURITY_JWT_EXPIRY_HOURS must be between 1 and 87600, got {0}")]
    InvalidTokenExpiry(u64),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.database.backend = match v.as_str() {
                "memory" => Backend::Memory,
                _ => Backend::Postgres,
            };
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_MAX_LIST_LIMIT") {
            self.api.max_list_limit = v.parse().unwrap_or(self.api.max_list_limit);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("API_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("PASSWORD_HASH_MEMORY_KIB") {
            self.security.password_hash_memory_kib =
                v.parse().unwrap_or(self.security.password_hash_memory_kib);
        }
        if let Ok(v) = env::var("PASSWORD_HASH_ITERATIONS") {
            self.security.password_hash_iterations =
                v.parse().unwrap_or(self.security.password_hash_iterations);
        }

        self
    }

    /// Checks the settings that cannot be defaulted safely
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.api.port == 0 {
            return Err(ConfigError::InvalidPort(self.api.port));
        }
        if self.api.max_list_limit <= 0 {
            return Err(ConfigError::InvalidListLimit);
        }
        let expiry = self.security.jwt_expiry_hours;
        if expiry == 0 || expiry > SecurityConfig::MAX_JWT_EXPIRY_HOURS {
            return Err(ConfigError::InvalidTokenExpiry(expiry));
        }
        Ok(())
    }

    /// Clamp a requested list size to the configured maximum
    pub fn list_limit(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(n) if n > 0 => n.min(self.api.max_list_limit),
            _ => self.api.max_list_limit,
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                backend: Backend::Postgres,
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: String::new(),
                name: "stakeout".to_string(),
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 8080,
                max_list_limit: 100,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                password_hash_memory_kib: 19 * 1024,
                password_hash_iterations: 2,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                ..Self::development().database
            },
            api: ApiConfig {
                port: 8080,
                max_list_limit: 100,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                password_hash_memory_kib: 19 * 1024,
                password_hash_iterations: 2,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                ..Self::development().database
            },
            api: ApiConfig {
                port: 8080,
                max_list_limit: 100,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: false,
                password_hash_memory_kib: 19 * 1024,
                password_hash_iterations: 2,
            },
        }
    }

    /// In-memory store, cheap password hashing and a fixed secret
    pub fn testing() -> Self {
        let mut config = Self::development();
        config.database.backend = Backend::Memory;
        config.api.enable_request_logging = false;
        config.security.jwt_secret = "test-secret".to_string();
        config.security.password_hash_memory_kib = 1024;
        config.security.password_hash_iterations = 1;
        config
    }
}
