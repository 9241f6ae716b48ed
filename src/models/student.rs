use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{check_email, check_password, check_phone, is_blank, Account, ValidationError};
use crate::types::Action;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub account: Account,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub university: String,
    pub mobile_number: String,
    pub country: String,
    pub grad_year: i32,
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Student fields accepted from clients, for both create and partial update
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StudentInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub university: Option<String>,
    pub mobile_number: Option<String>,
    pub country: Option<String>,
    pub grad_year: Option<i32>,
}

impl StudentInput {
    /// First failing rule wins
    pub fn validate(&self, action: Action) -> Result<(), ValidationError> {
        match action {
            Action::Update => {
                if let Some(email) = &self.email {
                    check_email(Some(email.as_str()))?;
                }
                if self.password.is_some() {
                    check_password(self.password.as_deref())?;
                }
                if let (Some(number), Some(country)) = (&self.mobile_number, &self.country) {
                    if !number.is_empty() && !country.is_empty() {
                        check_phone(number, country)?;
                    }
                }
                Ok(())
            }
            Action::Create => {
                if is_blank(&self.email) {
                    return Err(ValidationError::RequiredEmail);
                }
                check_password(self.password.as_deref())?;
                check_email(self.email.as_deref())?;
                if is_blank(&self.country) {
                    return Err(ValidationError::RequiredCountryCode);
                }
                if is_blank(&self.mobile_number) {
                    return Err(ValidationError::RequiredPhoneNumber);
                }
                check_phone(
                    self.mobile_number.as_deref().unwrap_or_default(),
                    self.country.as_deref().unwrap_or_default(),
                )
            }
        }
    }

    /// Build a new row. Loyalty points always start at zero.
    pub fn into_student(self, password_hash: String, now: DateTime<Utc>) -> Student {
        Student {
            id: Uuid::new_v4(),
            account: Account::new(self.email.unwrap_or_default(), password_hash),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            birth_date: self.birth_date,
            university: self.university.unwrap_or_default(),
            mobile_number: self.mobile_number.unwrap_or_default(),
            country: self.country.unwrap_or_default().to_ascii_uppercase(),
            grad_year: self.grad_year.unwrap_or_default(),
            points: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Copy the provided fields onto an existing row. Identity, creation time
    /// and points are never touched; a new password must already be hashed.
    pub fn apply(self, student: &mut Student, password_hash: Option<String>, now: DateTime<Utc>) {
        if let Some(email) = self.email {
            student.account.email = email;
        }
        if let Some(hash) = password_hash {
            student.account.password = hash;
        }
        if let Some(v) = self.first_name {
            student.first_name = v;
        }
        if let Some(v) = self.last_name {
            student.last_name = v;
        }
        if self.birth_date.is_some() {
            student.birth_date = self.birth_date;
        }
        if let Some(v) = self.university {
            student.university = v;
        }
        if let Some(v) = self.mobile_number {
            student.mobile_number = v;
        }
        if let Some(v) = self.country {
            student.country = v.to_ascii_uppercase();
        }
        if let Some(v) = self.grad_year {
            student.grad_year = v;
        }
        student.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> StudentInput {
        StudentInput {
            email: Some("email@email.com".into()),
            password: Some("password".into()),
            first_name: Some("Donald".into()),
            mobile_number: Some("07547775660".into()),
            country: Some("GB".into()),
            ..Default::default()
        }
    }

    #[test]
    fn create_requires_fields_in_order() {
        assert!(valid().validate(Action::Create).is_ok());

        let cases = [
            (StudentInput { email: None, ..valid() }, ValidationError::RequiredEmail),
            (StudentInput { password: Some(String::new()), ..valid() }, ValidationError::RequiredPassword),
            (StudentInput { email: Some("emailemail.com".into()), ..valid() }, ValidationError::InvalidEmail),
            (StudentInput { country: None, ..valid() }, ValidationError::RequiredCountryCode),
            (StudentInput { mobile_number: None, ..valid() }, ValidationError::RequiredPhoneNumber),
            (StudentInput { mobile_number: Some("123".into()), ..valid() }, ValidationError::InvalidPhoneNumber),
        ];
        for (input, expected) in cases {
            assert_eq!(input.validate(Action::Create), Err(expected));
        }
    }

    #[test]
    fn update_only_checks_phone_when_both_parts_present() {
        let partial = StudentInput {
            mobile_number: Some("123".into()),
            ..Default::default()
        };
        assert!(partial.validate(Action::Update).is_ok());

        let both = StudentInput {
            mobile_number: Some("123".into()),
            country: Some("GB".into()),
            ..Default::default()
        };
        assert_eq!(both.validate(Action::Update), Err(ValidationError::InvalidPhoneNumber));
    }

    #[test]
    fn new_students_start_without_points() {
        let student = valid().into_student("hash".into(), Utc::now());
        assert_eq!(student.points, 0);
        assert_eq!(student.account.password, "hash");
        assert!(!student.account.verified);
    }

    #[test]
    fn apply_keeps_identity() {
        let mut student = valid().into_student("hash".into(), Utc::now());
        let (id, created) = (student.id, student.created_at);

        let changes = StudentInput {
            first_name: Some("Ada".into()),
            ..Default::default()
        };
        changes.apply(&mut student, None, Utc::now());

        assert_eq!(student.id, id);
        assert_eq!(student.created_at, created);
        assert_eq!(student.first_name, "Ada");
        assert_eq!(student.account.password, "hash");
    }
}
