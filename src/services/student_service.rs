use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::access::{self, Caller};
use crate::auth::PasswordHasher;
use crate::database::Store;
use crate::models::{Payload, Student, StudentInput};
use crate::types::Action;

pub struct StudentService<'a> {
    store: &'a dyn Store,
    hasher: &'a PasswordHasher,
}

impl<'a> StudentService<'a> {
    pub fn new(store: &'a dyn Store, hasher: &'a PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn create(&self, payload: Payload<StudentInput>) -> Result<Student, ServiceError> {
        let mut input = payload.decode()?;
        input.validate(Action::Create)?;

        let hash = self.hasher.hash(input.password.take().unwrap_or_default().as_str())?;
        let student = input.into_student(hash, Utc::now());

        let mut unit = self.store.begin().await?;
        unit.tables().insert_student(&student).await?;
        unit.commit().await?;

        info!(student_id = %student.id, "Created student");
        Ok(student)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Student, ServiceError> {
        let mut unit = self.store.begin().await?;
        unit.tables()
            .find_student(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student"))
    }

    pub async fn find_all(&self, limit: i64) -> Result<Vec<Student>, ServiceError> {
        let mut unit = self.store.begin().await?;
        Ok(unit.tables().list_students(limit).await?)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        payload: Payload<StudentInput>,
    ) -> Result<Student, ServiceError> {
        access::require_self(caller, id)?;

        let mut input = payload.decode()?;
        input.validate(Action::Update)?;
        let hash = match input.password.take() {
            Some(password) => Some(self.hasher.hash(&password)?),
            None => None,
        };

        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let mut student = tables
            .find_student(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student"))?;

        input.apply(&mut student, hash, Utc::now());
        tables.update_student(&student).await?;
        unit.commit().await?;

        info!(student_id = %id, "Updated student");
        Ok(student)
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<u64, ServiceError> {
        access::require_self(caller, id)?;

        let mut unit = self.store.begin().await?;
        let rows = unit.tables().delete_student(id, Utc::now()).await?;
        if rows == 0 {
            return Err(ServiceError::not_found("Student"));
        }
        unit.commit().await?;

        info!(student_id = %id, "Deleted student");
        Ok(rows)
    }
}
