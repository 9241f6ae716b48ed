use chrono::{NaiveDate, Utc};
use tracing::info;

use super::ServiceError;
use crate::auth::PasswordHasher;
use crate::database::Store;
use crate::models::StudentInput;
use crate::types::Action;

pub const DEMO_STUDENT_EMAIL: &str = "2310549a@student.gla.ac.uk";

fn demo_student() -> StudentInput {
    StudentInput {
        email: Some(DEMO_STUDENT_EMAIL.to_string()),
        password: Some("password".to_string()),
        first_name: Some("Aliou".to_string()),
        last_name: Some("Amar".to_string()),
        birth_date: NaiveDate::from_ymd_opt(1997, 9, 10),
        university: Some("University of Glasgow".to_string()),
        mobile_number: Some("07547775660".to_string()),
        country: Some("GB".to_string()),
        grad_year: Some(2021),
    }
}

/// Insert the verified demo student unless its email is already taken.
/// Returns whether a row was written.
pub async fn seed(store: &dyn Store, hasher: &PasswordHasher) -> Result<bool, ServiceError> {
    let mut input = demo_student();
    input.validate(Action::Create)?;
    let hash = hasher.hash(input.password.take().unwrap_or_default().as_str())?;

    let mut unit = store.begin().await?;
    let tables = unit.tables();
    if tables.find_student_by_email(DEMO_STUDENT_EMAIL).await?.is_some() {
        info!(email = DEMO_STUDENT_EMAIL, "Seed data already present");
        return Ok(false);
    }

    let mut student = input.into_student(hash, Utc::now());
    student.account.verified = true;
    tables.insert_student(&student).await?;
    unit.commit().await?;

    info!(student_id = %student.id, "Seeded demo student");
    Ok(true)
}
