use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Product, Shop, Student, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum OrderStatus {
    #[default]
    Pending = 0,
    Paid = 1,
    Received = 2,
    Confirmed = 3,
    Refunding = 4,
    Refunded = 5,
    Cancelled = 6,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub student_id: Uuid,
    pub shop_id: Uuid,
    /// Sum of the item prices when the order was placed
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub ordered_by: Student,
    pub ordered_from: Shop,
    pub ordered_items: Vec<Product>,
}

/// Reference to a product inside an order body. Clients may send whole
/// product objects; only the id is read.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ItemRef {
    pub id: Uuid,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OrderInput {
    /// Filled from the request path
    pub student_id: Option<Uuid>,
    pub shop_id: Option<Uuid>,
    pub ordered_items: Vec<ItemRef>,
}

impl OrderInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.student_id.is_none() {
            return Err(ValidationError::RequiredStudent);
        }
        if self.shop_id.is_none() {
            return Err(ValidationError::RequiredShop);
        }
        if self.ordered_items.is_empty() {
            return Err(ValidationError::RequiredOrderItems);
        }
        Ok(())
    }

    pub fn product_ids(&self) -> Vec<Uuid> {
        self.ordered_items.iter().map(|item| item.id).collect()
    }
}

impl Order {
    /// Every item must already be known to belong to `shop_id`
    pub fn place(
        student_id: Uuid,
        shop_id: Uuid,
        items: &[Product],
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::RequiredOrderItems);
        }
        if items.iter().any(|p| p.shop_id != shop_id) {
            return Err(ValidationError::ProductNotSoldByShop);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            student_id,
            shop_id,
            total_price: items.iter().map(|p| p.price).sum(),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }
}

/// Shop-side order update. Only the status moves; the total is fixed.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OrderChanges {
    pub status: Option<OrderStatus>,
}

impl OrderChanges {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.status.is_none() {
            return Err(ValidationError::RequiredOrderStatus);
        }
        Ok(())
    }

    pub fn apply(self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            order.status = status;
        }
        order.updated_at = now;
    }
}
