use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{cascade, ServiceError};
use crate::access::{self, Caller};
use crate::auth::PasswordHasher;
use crate::database::{Store, Tables};
use crate::models::{Admin, AdminInput, AdminView, Payload, Shop};
use crate::types::Action;

pub struct AdminService<'a> {
    store: &'a dyn Store,
    hasher: &'a PasswordHasher,
}

impl<'a> AdminService<'a> {
    pub fn new(store: &'a dyn Store, hasher: &'a PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// New admins run no shop until they open one
    pub async fn create(&self, payload: Payload<AdminInput>) -> Result<AdminView, ServiceError> {
        let mut input = payload.decode()?;
        input.validate(Action::Create)?;
        let hash = self.hasher.hash(input.password.take().unwrap_or_default().as_str())?;

        let admin = input.into_admin(hash, Utc::now());
        let mut unit = self.store.begin().await?;
        unit.tables().insert_admin(&admin).await?;
        unit.commit().await?;

        info!(admin_id = %admin.id, "Created admin");
        Ok(AdminView { admin, shop: None })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<AdminView, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let admin = tables
            .find_admin(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Admin"))?;
        let shop = assigned_shop(tables, admin.shop_id).await?;
        Ok(AdminView { admin, shop })
    }

    pub async fn find_all(&self, limit: i64) -> Result<Vec<Admin>, ServiceError> {
        let mut unit = self.store.begin().await?;
        Ok(unit.tables().list_admins(limit).await?)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        payload: Payload<AdminInput>,
    ) -> Result<AdminView, ServiceError> {
        access::require_admin_identity(caller, id)?;

        let mut input = payload.decode()?;
        input.validate(Action::Update)?;
        let hash = match input.password.take() {
            Some(password) => Some(self.hasher.hash(&password)?),
            None => None,
        };

        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let mut admin = tables
            .find_admin(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Admin"))?;

        input.apply(&mut admin, hash, Utc::now());
        let shop = assigned_shop(tables, admin.shop_id).await?;
        tables.update_admin(&admin).await?;
        unit.commit().await?;

        info!(admin_id = %id, "Updated admin");
        Ok(AdminView { admin, shop })
    }

    /// Returns the admin row plus the shop row when the admin was the
    /// last one running it.
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<u64, ServiceError> {
        access::require_admin_identity(caller, id)?;

        let mut unit = self.store.begin().await?;
        let rows = cascade::delete_admin(unit.tables(), id, Utc::now()).await?;
        unit.commit().await?;

        info!(admin_id = %id, rows, "Deleted admin");
        Ok(rows)
    }
}

/// The shop an admin runs, which must still exist
async fn assigned_shop(tables: &mut dyn Tables, shop_id: Option<Uuid>) -> Result<Option<Shop>, ServiceError> {
    match shop_id {
        Some(id) => tables
            .find_shop(id)
            .await?
            .map(Some)
            .ok_or_else(|| ServiceError::not_found("Shop")),
        None => Ok(None),
    }
}
