//! Ownership and role checks.
//!
//! Each rule is a small pure function over the authenticated [`Caller`] and
//! the rows a request targets. Services call them inside the same unit of
//! work that performs the write, so a check and the action it guards see
//! the same data.

use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;
use crate::models::{Admin, Order, Product};
use crate::types::Role;

/// Identity proven by a validated bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub subject: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// True when the token was issued to exactly this entity id
    pub fn is(&self, id: Uuid) -> bool {
        Uuid::parse_str(&self.subject).map_or(false, |subject| subject == id)
    }

    /// Subject as an id, for rules that look the caller up
    pub fn id(&self) -> Result<Uuid, AccessError> {
        Uuid::parse_str(&self.subject).map_err(|_| AccessError::Unauthorized)
    }
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unauthorized: This is not an admin token")]
    NotAdmin,

    #[error("Unauthorized: You are not the admin for this shop")]
    NotShopAdmin,

    #[error("Unauthorized: This product does not belong to the given shop")]
    ProductNotInShop,

    #[error("Unauthorized: This order does not belong to the given shop")]
    OrderNotInShop,
}

/// Student update/delete, order create and list-by-student
pub fn require_self(caller: &Caller, id: Uuid) -> Result<(), AccessError> {
    if caller.is(id) {
        Ok(())
    } else {
        Err(AccessError::Unauthorized)
    }
}

pub fn require_admin(caller: &Caller) -> Result<(), AccessError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(AccessError::NotAdmin)
    }
}

/// Admin token whose subject is the admin named in the path
pub fn require_admin_identity(caller: &Caller, admin_id: Uuid) -> Result<(), AccessError> {
    require_admin(caller)?;
    require_self(caller, admin_id)
}

pub fn require_shop_admin(admin: &Admin, shop_id: Uuid) -> Result<(), AccessError> {
    if admin.runs_shop(shop_id) {
        Ok(())
    } else {
        Err(AccessError::NotShopAdmin)
    }
}

pub fn require_product_in_shop(product: &Product, shop_id: Uuid) -> Result<(), AccessError> {
    if product.shop_id == shop_id {
        Ok(())
    } else {
        Err(AccessError::ProductNotInShop)
    }
}

pub fn require_order_in_shop(order: &Order, shop_id: Uuid) -> Result<(), AccessError> {
    if order.shop_id == shop_id {
        Ok(())
    } else {
        Err(AccessError::OrderNotInShop)
    }
}

/// An order is visible to the student who placed it and to admins of the
/// shop it was placed with. `admin` is the caller's admin row, if any.
pub fn require_order_reader(caller: &Caller, admin: Option<&Admin>, order: &Order) -> Result<(), AccessError> {
    if caller.is(order.student_id) {
        return Ok(());
    }
    match admin {
        Some(admin) if caller.is_admin() && admin.runs_shop(order.shop_id) => Ok(()),
        _ => Err(AccessError::Unauthorized),
    }
}
