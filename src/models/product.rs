use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Shop, ValidationError};
use crate::types::Action;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// SKU
    pub code: String,
    pub price: Decimal,
    pub currency: String,
    pub is_in_sale: bool,
    pub discount: i32,
    pub discount_unit: String,
    pub reward: i32,
    pub shop_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub sold_by: Shop,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub is_in_sale: Option<bool>,
    pub discount: Option<i32>,
    pub discount_unit: Option<String>,
    pub reward: Option<i32>,
    /// Filled from the request path, any client value is overwritten
    pub shop_id: Option<Uuid>,
}

impl ProductInput {
    pub const DEFAULT_CURRENCY: &'static str = "GBP";

    pub fn validate(&self, action: Action) -> Result<(), ValidationError> {
        match action {
            Action::Create => {
                if super::is_blank(&self.name) {
                    return Err(ValidationError::RequiredProductName);
                }
                check_price(self.price.unwrap_or_default())?;
                if self.shop_id.is_none() {
                    return Err(ValidationError::RequiredShop);
                }
                Ok(())
            }
            Action::Update => {
                if self.name.as_deref() == Some("") {
                    return Err(ValidationError::RequiredProductName);
                }
                if let Some(price) = self.price {
                    check_price(price)?;
                }
                Ok(())
            }
        }
    }

    /// Call after `validate(Action::Create)`; a missing shop becomes the nil id
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            code: self.code.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            currency: self
                .currency
                .unwrap_or_else(|| Self::DEFAULT_CURRENCY.to_string()),
            is_in_sale: self.is_in_sale.unwrap_or_default(),
            discount: self.discount.unwrap_or_default(),
            discount_unit: self.discount_unit.unwrap_or_default(),
            reward: self.reward.unwrap_or_default(),
            shop_id: self.shop_id.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// The owning shop never changes through an update
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            product.name = v;
        }
        if let Some(v) = self.description {
            product.description = v;
        }
        if let Some(v) = self.code {
            product.code = v;
        }
        if let Some(v) = self.price {
            product.price = v;
        }
        if let Some(v) = self.currency {
            product.currency = v;
        }
        if let Some(v) = self.is_in_sale {
            product.is_in_sale = v;
        }
        if let Some(v) = self.discount {
            product.discount = v;
        }
        if let Some(v) = self.discount_unit {
            product.discount_unit = v;
        }
        if let Some(v) = self.reward {
            product.reward = v;
        }
        product.updated_at = now;
    }
}

/// Stored prices carry two decimal places
const PRICE_SCALE: u32 = 2;

fn check_price(price: Decimal) -> Result<(), ValidationError> {
    if price.is_zero() {
        return Err(ValidationError::RequiredProductPrice);
    }
    if price.is_sign_negative() {
        return Err(ValidationError::NegativeProductPrice);
    }
    // Trailing zeros are fine, "2.500" is still 2.50
    if price.normalize().scale() > PRICE_SCALE {
        return Err(ValidationError::ProductPricePrecision);
    }
    Ok(())
}
