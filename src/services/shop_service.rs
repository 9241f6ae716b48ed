use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{cascade, ServiceError};
use crate::access::{self, Caller};
use crate::database::Store;
use crate::models::{Payload, Shop, ShopInput, ValidationError};
use crate::types::Action;

pub struct ShopService<'a> {
    store: &'a dyn Store,
}

impl<'a> ShopService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// The creating admin becomes the shop's admin. An admin runs at most
    /// one shop, so one that already has a shop is turned away.
    pub async fn create(
        &self,
        caller: &Caller,
        admin_id: Uuid,
        payload: Payload<ShopInput>,
    ) -> Result<Shop, ServiceError> {
        access::require_admin_identity(caller, admin_id)?;

        let input = payload.decode()?;
        input.validate(Action::Create)?;

        let now = Utc::now();
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let mut admin = tables
            .find_admin(admin_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Admin"))?;
        if admin.shop_id.is_some() {
            return Err(ValidationError::AlreadyRunsShop.into());
        }

        let shop = input.into_shop(now);
        tables.insert_shop(&shop).await?;

        admin.shop_id = Some(shop.id);
        admin.updated_at = now;
        tables.update_admin(&admin).await?;
        unit.commit().await?;

        info!(shop_id = %shop.id, %admin_id, "Created shop");
        Ok(shop)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Shop, ServiceError> {
        let mut unit = self.store.begin().await?;
        unit.tables()
            .find_shop(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shop"))
    }

    pub async fn find_all(&self, limit: i64) -> Result<Vec<Shop>, ServiceError> {
        let mut unit = self.store.begin().await?;
        Ok(unit.tables().list_shops(limit).await?)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        admin_id: Uuid,
        shop_id: Uuid,
        payload: Payload<ShopInput>,
    ) -> Result<Shop, ServiceError> {
        access::require_admin_identity(caller, admin_id)?;

        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let admin = tables
            .find_admin(admin_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Admin"))?;
        access::require_shop_admin(&admin, shop_id)?;

        let input = payload.decode()?;
        input.validate(Action::Update)?;

        let mut shop = tables
            .find_shop(shop_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shop"))?;
        input.apply(&mut shop, Utc::now());
        tables.update_shop(&shop).await?;
        unit.commit().await?;

        info!(%shop_id, %admin_id, "Updated shop");
        Ok(shop)
    }

    pub async fn delete(&self, caller: &Caller, admin_id: Uuid, shop_id: Uuid) -> Result<u64, ServiceError> {
        access::require_admin_identity(caller, admin_id)?;

        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let admin = tables
            .find_admin(admin_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Admin"))?;
        access::require_shop_admin(&admin, shop_id)?;

        let rows = cascade::retire_shop(tables, shop_id, Utc::now()).await?;
        if rows == 0 {
            return Err(ServiceError::not_found("Shop"));
        }
        unit.commit().await?;

        info!(%shop_id, %admin_id, "Deleted shop");
        Ok(rows)
    }
}
