pub mod manager;
pub mod memory;
pub mod postgres;
pub mod tables;

use std::sync::Arc;

use tracing::info;

use crate::config::{Backend, DatabaseConfig};

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use tables::{Store, Tables, UnitOfWork};

/// Build the configured backend. Postgres is migrated before it is handed out.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
    match config.backend {
        Backend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        Backend::Postgres => {
            let pool = DatabaseManager::connect(config).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
