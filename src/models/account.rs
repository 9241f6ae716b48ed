use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{check_email, check_password, ValidationError};

/// Login fields shared by students and admins, embedded by both
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub email: String,
    /// Argon2 PHC string, never the plaintext
    #[serde(skip_serializing)]
    pub password: String,
    pub verified: bool,
}

impl Account {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            email,
            password: password_hash,
            verified: false,
        }
    }
}

/// Body of the login endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if super::is_blank(&self.email) {
            return Err(ValidationError::RequiredEmail);
        }
        check_password(self.password.as_deref())?;
        check_email(self.email.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_checks_presence_before_format() {
        let creds = Credentials {
            email: Some("not-an-email".into()),
            password: None,
        };
        assert_eq!(creds.validate(), Err(ValidationError::RequiredPassword));

        let creds = Credentials {
            email: Some("not-an-email".into()),
            password: Some("password".into()),
        };
        assert_eq!(creds.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let account = Account::new("a@b.com".into(), "$argon2id$secret".into());
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "a@b.com");
    }
}
