use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{acting_admin, ServiceError};
use crate::access::{self, Caller};
use crate::database::{Store, Tables};
use crate::models::{Payload, Product, ProductInput, ProductView, Shop};
use crate::types::Action;

pub struct ProductService<'a> {
    store: &'a dyn Store,
}

impl<'a> ProductService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// The owning shop always comes from the path
    pub async fn create(
        &self,
        caller: &Caller,
        shop_id: Uuid,
        payload: Payload<ProductInput>,
    ) -> Result<ProductView, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let admin = acting_admin(tables, caller).await?;
        access::require_shop_admin(&admin, shop_id)?;

        let mut input = payload.decode()?;
        input.shop_id = Some(shop_id);
        input.validate(Action::Create)?;

        let shop = find_shop(tables, shop_id).await?;
        let product = input.into_product(Utc::now());
        tables.insert_product(&product).await?;
        unit.commit().await?;

        info!(product_id = %product.id, %shop_id, "Created product");
        Ok(ProductView { product, sold_by: shop })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<ProductView, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let product = tables
            .find_product(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product"))?;
        let shop = find_shop(tables, product.shop_id).await?;
        Ok(ProductView { product, sold_by: shop })
    }

    pub async fn find_all(&self, limit: i64) -> Result<Vec<Product>, ServiceError> {
        let mut unit = self.store.begin().await?;
        Ok(unit.tables().list_products(limit).await?)
    }

    pub async fn find_by_shop(&self, shop_id: Uuid, limit: i64) -> Result<Vec<Product>, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        find_shop(tables, shop_id).await?;
        Ok(tables.list_products_by_shop(shop_id, limit).await?)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        shop_id: Uuid,
        product_id: Uuid,
        payload: Payload<ProductInput>,
    ) -> Result<Product, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let mut product = owned_product(tables, caller, shop_id, product_id).await?;

        let input = payload.decode()?;
        input.validate(Action::Update)?;
        input.apply(&mut product, Utc::now());
        tables.update_product(&product).await?;
        unit.commit().await?;

        info!(%product_id, %shop_id, "Updated product");
        Ok(product)
    }

    pub async fn delete(&self, caller: &Caller, shop_id: Uuid, product_id: Uuid) -> Result<u64, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        owned_product(tables, caller, shop_id, product_id).await?;

        let rows = tables.delete_product(product_id, Utc::now()).await?;
        unit.commit().await?;

        info!(%product_id, %shop_id, "Deleted product");
        Ok(rows)
    }
}

async fn find_shop(tables: &mut dyn Tables, shop_id: Uuid) -> Result<Shop, ServiceError> {
    tables
        .find_shop(shop_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Shop"))
}

/// Walks admin -> shop -> product for a mutation
async fn owned_product(
    tables: &mut dyn Tables,
    caller: &Caller,
    shop_id: Uuid,
    product_id: Uuid,
) -> Result<Product, ServiceError> {
    let admin = acting_admin(tables, caller).await?;
    access::require_shop_admin(&admin, shop_id)?;

    let product = tables
        .find_product(product_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))?;
    access::require_product_in_shop(&product, shop_id)?;
    Ok(product)
}
