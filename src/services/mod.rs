//! Entity operations.
//!
//! Every service method follows the same sequence: authorize the caller,
//! decode and validate the body, then read and write through a single unit
//! of work. Checks that need stored rows run inside that same unit.

pub mod admin_service;
pub mod cascade;
pub mod order_service;
pub mod product_service;
pub mod seed;
pub mod session_service;
pub mod shop_service;
pub mod student_service;

use thiserror::Error;

use crate::access::{self, AccessError, Caller};
use crate::auth::{password::HashError, AuthError};
use crate::database::{DatabaseError, Tables};
use crate::models::{Admin, ValidationError};

pub use admin_service::AdminService;
pub use order_service::OrderService;
pub use product_service::ProductService;
pub use session_service::SessionService;
pub use shop_service::ShopService;
pub use student_service::StudentService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("Incorrect email or password")]
    InvalidCredentials,
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        ServiceError::Database(DatabaseError::not_found(entity))
    }
}

/// Resolve an admin token to its admin row. A token whose admin has since
/// been deleted is treated as unauthorized.
pub(crate) async fn acting_admin(tables: &mut dyn Tables, caller: &Caller) -> Result<Admin, ServiceError> {
    access::require_admin(caller)?;
    let id = caller.id()?;
    tables
        .find_admin(id)
        .await?
        .ok_or(ServiceError::Access(AccessError::Unauthorized))
}
