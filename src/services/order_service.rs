use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{acting_admin, ServiceError};
use crate::access::{self, Caller};
use crate::database::{Store, Tables};
use crate::models::{Order, OrderChanges, OrderInput, OrderView, Payload, ValidationError};

pub struct OrderService<'a> {
    store: &'a dyn Store,
}

impl<'a> OrderService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Place an order for the calling student. The total is fixed here.
    pub async fn create(
        &self,
        caller: &Caller,
        student_id: Uuid,
        payload: Payload<OrderInput>,
    ) -> Result<OrderView, ServiceError> {
        access::require_self(caller, student_id)?;

        let mut input = payload.decode()?;
        input.student_id = Some(student_id);
        input.validate()?;
        let shop_id = input.shop_id.ok_or(ValidationError::RequiredShop)?;
        let product_ids = input.product_ids();

        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let student = tables
            .find_student(student_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student"))?;
        let shop = tables
            .find_shop(shop_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shop"))?;

        let mut items = Vec::with_capacity(product_ids.len());
        for id in &product_ids {
            let product = tables
                .find_product(*id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Product"))?;
            items.push(product);
        }

        let order = Order::place(student_id, shop_id, &items, Utc::now())?;
        tables.insert_order(&order, &product_ids).await?;
        unit.commit().await?;

        info!(order_id = %order.id, %student_id, %shop_id, total = %order.total_price, "Placed order");
        Ok(OrderView {
            order,
            ordered_by: student,
            ordered_from: shop,
            ordered_items: items,
        })
    }

    /// Readable by the student who placed it and by admins of its shop
    pub async fn find_by_id(&self, caller: &Caller, id: Uuid) -> Result<OrderView, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let order = tables
            .find_order(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order"))?;

        let admin = match (caller.is_admin(), caller.id()) {
            (true, Ok(admin_id)) => tables.find_admin(admin_id).await?,
            _ => None,
        };
        access::require_order_reader(caller, admin.as_ref(), &order)?;

        view(tables, order).await
    }

    pub async fn find_all(&self, caller: &Caller, limit: i64) -> Result<Vec<Order>, ServiceError> {
        access::require_admin(caller)?;
        let mut unit = self.store.begin().await?;
        Ok(unit.tables().list_orders(limit).await?)
    }

    pub async fn find_by_student(
        &self,
        caller: &Caller,
        student_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Order>, ServiceError> {
        access::require_self(caller, student_id)?;

        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        if tables.find_student(student_id).await?.is_none() {
            return Err(ServiceError::not_found("Student"));
        }
        Ok(tables.list_orders_by_student(student_id, limit).await?)
    }

    pub async fn find_by_shop(&self, caller: &Caller, shop_id: Uuid, limit: i64) -> Result<Vec<Order>, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let admin = acting_admin(tables, caller).await?;
        access::require_shop_admin(&admin, shop_id)?;
        Ok(tables.list_orders_by_shop(shop_id, limit).await?)
    }

    /// Status only; items and total stay as placed
    pub async fn update(
        &self,
        caller: &Caller,
        shop_id: Uuid,
        order_id: Uuid,
        payload: Payload<OrderChanges>,
    ) -> Result<Order, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        let mut order = owned_order(tables, caller, shop_id, order_id).await?;

        let changes = payload.decode()?;
        changes.validate()?;
        changes.apply(&mut order, Utc::now());
        tables.update_order(&order).await?;
        unit.commit().await?;

        info!(%order_id, %shop_id, status = ?order.status, "Updated order");
        Ok(order)
    }

    pub async fn delete(&self, caller: &Caller, shop_id: Uuid, order_id: Uuid) -> Result<u64, ServiceError> {
        let mut unit = self.store.begin().await?;
        let tables = unit.tables();
        owned_order(tables, caller, shop_id, order_id).await?;

        let rows = tables.delete_order(order_id, Utc::now()).await?;
        unit.commit().await?;

        info!(%order_id, %shop_id, "Deleted order");
        Ok(rows)
    }
}

/// Resolve every relation of an order. A missing relation fails the read.
async fn view(tables: &mut dyn Tables, order: Order) -> Result<OrderView, ServiceError> {
    let student = tables
        .find_student(order.student_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Student"))?;
    let shop = tables
        .find_shop(order.shop_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Shop"))?;
    let items = tables.order_products(order.id).await?;

    Ok(OrderView {
        order,
        ordered_by: student,
        ordered_from: shop,
        ordered_items: items,
    })
}

async fn owned_order(
    tables: &mut dyn Tables,
    caller: &Caller,
    shop_id: Uuid,
    order_id: Uuid,
) -> Result<Order, ServiceError> {
    let admin = acting_admin(tables, caller).await?;
    access::require_shop_admin(&admin, shop_id)?;

    let order = tables
        .find_order(order_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order"))?;
    access::require_order_in_shop(&order, shop_id)?;
    Ok(order)
}
