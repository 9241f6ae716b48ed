//! Entities, request payloads and their field-level validation rules.
//!
//! Every entity carries a UUID, creation/update timestamps and a nullable
//! `deleted_at` used for soft deletes. Relations are `Option<Uuid>` where
//! absence is allowed and plain `Uuid` where the row cannot exist without it.

pub mod account;
pub mod admin;
pub mod order;
pub mod payload;
pub mod product;
pub mod shop;
pub mod student;

use thiserror::Error;
use validator::ValidateEmail;

pub use account::{Account, Credentials};
pub use admin::{Admin, AdminInput, AdminView};
pub use order::{ItemRef, Order, OrderChanges, OrderInput, OrderStatus, OrderView};
pub use payload::Payload;
pub use product::{Product, ProductInput, ProductView};
pub use shop::{Shop, ShopInput};
pub use student::{Student, StudentInput};

/// Field validation failures. The display text is what clients receive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required Email")]
    RequiredEmail,
    #[error("Required Password")]
    RequiredPassword,
    #[error("Invalid Email")]
    InvalidEmail,
    #[error("Required Country Code")]
    RequiredCountryCode,
    #[error("Required Phone Number")]
    RequiredPhoneNumber,
    #[error("Phone number ain't valid")]
    InvalidPhoneNumber,

    #[error("Required shop name")]
    RequiredShopName,
    #[error("Required shop description")]
    RequiredShopDescription,
    #[error("Required shop postcode")]
    RequiredShopPostcode,
    #[error("Required shop address number")]
    RequiredShopNumber,
    #[error("Required shop address line 1")]
    RequiredShopAddress,
    #[error("Required town or city")]
    RequiredTownOrCity,
    #[error("This admin already runs a shop")]
    AlreadyRunsShop,

    #[error("Required product name")]
    RequiredProductName,
    #[error("Required product price")]
    RequiredProductPrice,
    #[error("Product price must be positive")]
    NegativeProductPrice,
    #[error("Product price cannot have more than 2 decimal places")]
    ProductPricePrecision,
    #[error("Required shop")]
    RequiredShop,

    #[error("Required student")]
    RequiredStudent,
    #[error("Required order items")]
    RequiredOrderItems,
    #[error("Required order status")]
    RequiredOrderStatus,
    #[error("Product is not sold by this shop")]
    ProductNotSoldByShop,

    #[error("{0}")]
    InvalidJson(String),
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Email must be present and well formed
pub(crate) fn check_email(email: Option<&str>) -> Result<(), ValidationError> {
    let email = email.unwrap_or_default();
    if email.is_empty() {
        return Err(ValidationError::RequiredEmail);
    }
    if !email.validate_email() {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub(crate) fn check_password(password: Option<&str>) -> Result<(), ValidationError> {
    match password {
        Some(p) if !p.is_empty() => Ok(()),
        _ => Err(ValidationError::RequiredPassword),
    }
}

/// The number must parse for the given ISO country and be a real, dialable number
pub(crate) fn check_phone(number: &str, country: &str) -> Result<(), ValidationError> {
    let country: phonenumber::country::Id = country
        .trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|_| ValidationError::InvalidPhoneNumber)?;

    let parsed = phonenumber::parse(Some(country), number)
        .map_err(|_| ValidationError::InvalidPhoneNumber)?;

    if !phonenumber::is_valid(&parsed) {
        return Err(ValidationError::InvalidPhoneNumber);
    }
    Ok(())
}

/// Treats `Some("")` the same as a missing field
pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
