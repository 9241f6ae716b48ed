use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{is_blank, ValidationError};
use crate::types::Action;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Shop {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub logo_link: String,
    pub latitude: f64,
    pub longitude: f64,
    pub postcode: String,
    pub address_1: String,
    pub town_or_city: String,
    /// Street number
    pub number: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ShopInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_link: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub postcode: Option<String>,
    pub address_1: Option<String>,
    pub town_or_city: Option<String>,
    pub number: Option<i32>,
}

impl ShopInput {
    /// On create every address field is required. On update a field that is
    /// sent must still satisfy the same rule.
    pub fn validate(&self, action: Action) -> Result<(), ValidationError> {
        let required = |value: &Option<String>| match action {
            Action::Create => is_blank(value),
            Action::Update => value.as_deref() == Some(""),
        };
        let missing_number = match action {
            Action::Create => self.number.unwrap_or_default() == 0,
            Action::Update => self.number == Some(0),
        };

        if required(&self.name) {
            return Err(ValidationError::RequiredShopName);
        }
        if required(&self.description) {
            return Err(ValidationError::RequiredShopDescription);
        }
        if required(&self.postcode) {
            return Err(ValidationError::RequiredShopPostcode);
        }
        if missing_number {
            return Err(ValidationError::RequiredShopNumber);
        }
        if required(&self.address_1) {
            return Err(ValidationError::RequiredShopAddress);
        }
        if required(&self.town_or_city) {
            return Err(ValidationError::RequiredTownOrCity);
        }
        Ok(())
    }

    pub fn into_shop(self, now: DateTime<Utc>) -> Shop {
        Shop {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            logo_link: self.logo_link.unwrap_or_default(),
            latitude: self.latitude.unwrap_or_default(),
            longitude: self.longitude.unwrap_or_default(),
            postcode: self.postcode.unwrap_or_default(),
            address_1: self.address_1.unwrap_or_default(),
            town_or_city: self.town_or_city.unwrap_or_default(),
            number: self.number.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(self, shop: &mut Shop, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            shop.name = v;
        }
        if let Some(v) = self.description {
            shop.description = v;
        }
        if let Some(v) = self.logo_link {
            shop.logo_link = v;
        }
        if let Some(v) = self.latitude {
            shop.latitude = v;
        }
        if let Some(v) = self.longitude {
            shop.longitude = v;
        }
        if let Some(v) = self.postcode {
            shop.postcode = v;
        }
        if let Some(v) = self.address_1 {
            shop.address_1 = v;
        }
        if let Some(v) = self.town_or_city {
            shop.town_or_city = v;
        }
        if let Some(v) = self.number {
            shop.number = v;
        }
        shop.updated_at = now;
    }
}
