use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{check_email, check_password, is_blank, Account, Shop, ValidationError};
use crate::types::Action;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Admin {
    pub id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub account: Account,
    pub first_name: String,
    pub last_name: String,
    /// The one shop this admin runs, if any
    pub shop_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Admin {
    pub fn runs_shop(&self, shop_id: Uuid) -> bool {
        self.shop_id == Some(shop_id)
    }
}

/// Admin with its shop resolved
#[derive(Debug, Clone, Serialize)]
pub struct AdminView {
    #[serde(flatten)]
    pub admin: Admin,
    pub shop: Option<Shop>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AdminInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AdminInput {
    pub fn validate(&self, action: Action) -> Result<(), ValidationError> {
        match action {
            Action::Create => {
                if is_blank(&self.email) {
                    return Err(ValidationError::RequiredEmail);
                }
                check_password(self.password.as_deref())?;
                check_email(self.email.as_deref())
            }
            Action::Update => {
                if let Some(email) = &self.email {
                    check_email(Some(email.as_str()))?;
                }
                if self.password.is_some() {
                    check_password(self.password.as_deref())?;
                }
                Ok(())
            }
        }
    }

    pub fn into_admin(self, password_hash: String, now: DateTime<Utc>) -> Admin {
        Admin {
            id: Uuid::new_v4(),
            account: Account::new(self.email.unwrap_or_default(), password_hash),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            // A shop is only ever gained by opening one
            shop_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(self, admin: &mut Admin, password_hash: Option<String>, now: DateTime<Utc>) {
        if let Some(email) = self.email {
            admin.account.email = email;
        }
        if let Some(hash) = password_hash {
            admin.account.password = hash;
        }
        if let Some(v) = self.first_name {
            admin.first_name = v;
        }
        if let Some(v) = self.last_name {
            admin.last_name = v;
        }
        admin.updated_at = now;
    }
}
