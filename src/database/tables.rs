//! Storage seam shared by the Postgres and in-memory backends.
//!
//! [`Tables`] holds the primitive row operations. Every read skips rows whose
//! `deleted_at` is set, and every delete is a soft delete returning the
//! number of rows it touched. Services never see a backend directly: they
//! open a [`UnitOfWork`] through [`Store::begin`], run their reads, checks and
//! writes against `tables()`, then `commit()`. A unit dropped without a
//! commit is rolled back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::{Admin, Order, Product, Shop, Student};

#[async_trait]
pub trait Tables: Send {
    // Students
    async fn insert_student(&mut self, student: &Student) -> Result<(), DatabaseError>;
    async fn find_student(&mut self, id: Uuid) -> Result<Option<Student>, DatabaseError>;
    async fn find_student_by_email(&mut self, email: &str) -> Result<Option<Student>, DatabaseError>;
    async fn list_students(&mut self, limit: i64) -> Result<Vec<Student>, DatabaseError>;
    async fn update_student(&mut self, student: &Student) -> Result<u64, DatabaseError>;
    async fn delete_student(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError>;

    // Admins
    async fn insert_admin(&mut self, admin: &Admin) -> Result<(), DatabaseError>;
    async fn find_admin(&mut self, id: Uuid) -> Result<Option<Admin>, DatabaseError>;
    async fn find_admin_by_email(&mut self, email: &str) -> Result<Option<Admin>, DatabaseError>;
    async fn list_admins(&mut self, limit: i64) -> Result<Vec<Admin>, DatabaseError>;
    async fn update_admin(&mut self, admin: &Admin) -> Result<u64, DatabaseError>;
    async fn delete_admin(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError>;
    async fn count_admins_for_shop(&mut self, shop_id: Uuid) -> Result<i64, DatabaseError>;
    /// Clears `shop_id` on every live admin assigned to the shop
    async fn detach_admins(&mut self, shop_id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError>;

    // Shops
    async fn insert_shop(&mut self, shop: &Shop) -> Result<(), DatabaseError>;
    async fn find_shop(&mut self, id: Uuid) -> Result<Option<Shop>, DatabaseError>;
    async fn list_shops(&mut self, limit: i64) -> Result<Vec<Shop>, DatabaseError>;
    async fn update_shop(&mut self, shop: &Shop) -> Result<u64, DatabaseError>;
    async fn delete_shop(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError>;
    /// Holds the live shop row until the unit ends, serialising admin
    /// changes against it. False when there is no live row.
    async fn lock_shop(&mut self, id: Uuid) -> Result<bool, DatabaseError>;

    // Products
    async fn insert_product(&mut self, product: &Product) -> Result<(), DatabaseError>;
    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DatabaseError>;
    async fn list_products(&mut self, limit: i64) -> Result<Vec<Product>, DatabaseError>;
    async fn list_products_by_shop(&mut self, shop_id: Uuid, limit: i64) -> Result<Vec<Product>, DatabaseError>;
    async fn update_product(&mut self, product: &Product) -> Result<u64, DatabaseError>;
    async fn delete_product(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError>;
    async fn delete_products_by_shop(&mut self, shop_id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError>;

    // Orders
    async fn insert_order(&mut self, order: &Order, product_ids: &[Uuid]) -> Result<(), DatabaseError>;
    async fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DatabaseError>;
    async fn list_orders(&mut self, limit: i64) -> Result<Vec<Order>, DatabaseError>;
    async fn list_orders_by_student(&mut self, student_id: Uuid, limit: i64) -> Result<Vec<Order>, DatabaseError>;
    async fn list_orders_by_shop(&mut self, shop_id: Uuid, limit: i64) -> Result<Vec<Order>, DatabaseError>;
    async fn update_order(&mut self, order: &Order) -> Result<u64, DatabaseError>;
    async fn delete_order(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError>;
    /// Items in the order they were placed. Products deleted since are
    /// still returned so an order keeps its history.
    async fn order_products(&mut self, order_id: Uuid) -> Result<Vec<Product>, DatabaseError>;
}

/// One atomic batch of table operations
#[async_trait]
pub trait UnitOfWork: Send {
    fn tables(&mut self) -> &mut dyn Tables;
    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DatabaseError>;
    async fn ping(&self) -> Result<(), DatabaseError>;
}
