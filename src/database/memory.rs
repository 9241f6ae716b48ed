use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{DatabaseError, Store, Tables, UnitOfWork};
use crate::models::{Admin, Order, Product, Shop, Student};

/// Process-local store for development runs and the test suite.
///
/// A unit of work holds the table lock for its whole lifetime and edits a
/// private copy, so units are serialised and an uncommitted unit leaves the
/// shared tables untouched.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<MemoryTables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    students: Vec<Student>,
    admins: Vec<Admin>,
    shops: Vec<Shop>,
    products: Vec<Product>,
    orders: Vec<Order>,
    order_items: HashMap<Uuid, Vec<Uuid>>,
}

struct MemoryUnit {
    guard: OwnedMutexGuard<MemoryTables>,
    working: MemoryTables,
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    fn tables(&mut self) -> &mut dyn Tables {
        &mut self.working
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let MemoryUnit { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DatabaseError> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnit { guard, working }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Common shape of every table row
trait Row: Clone {
    fn id(&self) -> Uuid;
    fn deleted_at(&mut self) -> &mut Option<DateTime<Utc>>;

    fn is_live(&self) -> bool;
}

macro_rules! impl_row {
    ($($ty:ty),*) => {
        $(impl Row for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
            fn deleted_at(&mut self) -> &mut Option<DateTime<Utc>> {
                &mut self.deleted_at
            }
            fn is_live(&self) -> bool {
                self.deleted_at.is_none()
            }
        })*
    };
}

impl_row!(Student, Admin, Shop, Product, Order);

fn find<T: Row>(rows: &[T], id: Uuid) -> Option<T> {
    rows.iter().find(|r| r.is_live() && r.id() == id).cloned()
}

fn list<'a, T: Row + 'a>(rows: impl Iterator<Item = &'a T>, limit: i64) -> Vec<T> {
    let limit = usize::try_from(limit).unwrap_or(0);
    rows.filter(|r| r.is_live()).take(limit).cloned().collect()
}

fn replace<T: Row>(rows: &mut [T], row: &T) -> u64 {
    match rows.iter_mut().find(|r| r.is_live() && r.id() == row.id()) {
        Some(slot) => {
            *slot = row.clone();
            1
        }
        None => 0,
    }
}

fn soft_delete<T: Row>(rows: &mut [T], pred: impl Fn(&T) -> bool, at: DateTime<Utc>) -> u64 {
    let mut affected = 0;
    for row in rows.iter_mut() {
        if row.is_live() && pred(row) {
            *row.deleted_at() = Some(at);
            affected += 1;
        }
    }
    affected
}

/// Mirrors the partial unique indexes on `email`
fn email_conflict<'a>(
    mut live: impl Iterator<Item = (Uuid, &'a str)>,
    id: Uuid,
    email: &str,
    index: &str,
) -> Result<(), DatabaseError> {
    if live.any(|(other, existing)| other != id && existing == email) {
        return Err(DatabaseError::Conflict(format!(
            "duplicate key value violates unique constraint \"{index}\""
        )));
    }
    Ok(())
}

impl MemoryTables {
    fn check_student_email(&self, student: &Student) -> Result<(), DatabaseError> {
        let live = self
            .students
            .iter()
            .filter(|s| s.is_live())
            .map(|s| (s.id, s.account.email.as_str()));
        email_conflict(live, student.id, &student.account.email, "students_email_key")
    }

    fn check_admin_email(&self, admin: &Admin) -> Result<(), DatabaseError> {
        let live = self
            .admins
            .iter()
            .filter(|a| a.is_live())
            .map(|a| (a.id, a.account.email.as_str()));
        email_conflict(live, admin.id, &admin.account.email, "admins_email_key")
    }
}

#[async_trait]
impl Tables for MemoryTables {
    async fn insert_student(&mut self, student: &Student) -> Result<(), DatabaseError> {
        self.check_student_email(student)?;
        self.students.push(student.clone());
        Ok(())
    }

    async fn find_student(&mut self, id: Uuid) -> Result<Option<Student>, DatabaseError> {
        Ok(find(&self.students, id))
    }

    async fn find_student_by_email(&mut self, email: &str) -> Result<Option<Student>, DatabaseError> {
        Ok(self
            .students
            .iter()
            .find(|s| s.is_live() && s.account.email == email)
            .cloned())
    }

    async fn list_students(&mut self, limit: i64) -> Result<Vec<Student>, DatabaseError> {
        Ok(list(self.students.iter(), limit))
    }

    async fn update_student(&mut self, student: &Student) -> Result<u64, DatabaseError> {
        self.check_student_email(student)?;
        Ok(replace(&mut self.students, student))
    }

    async fn delete_student(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        Ok(soft_delete(&mut self.students, |s| s.id == id, at))
    }

    async fn insert_admin(&mut self, admin: &Admin) -> Result<(), DatabaseError> {
        self.check_admin_email(admin)?;
        self.admins.push(admin.clone());
        Ok(())
    }

    async fn find_admin(&mut self, id: Uuid) -> Result<Option<Admin>, DatabaseError> {
        Ok(find(&self.admins, id))
    }

    async fn find_admin_by_email(&mut self, email: &str) -> Result<Option<Admin>, DatabaseError> {
        Ok(self
            .admins
            .iter()
            .find(|a| a.is_live() && a.account.email == email)
            .cloned())
    }

    async fn list_admins(&mut self, limit: i64) -> Result<Vec<Admin>, DatabaseError> {
        Ok(list(self.admins.iter(), limit))
    }

    async fn update_admin(&mut self, admin: &Admin) -> Result<u64, DatabaseError> {
        self.check_admin_email(admin)?;
        Ok(replace(&mut self.admins, admin))
    }

    async fn delete_admin(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        Ok(soft_delete(&mut self.admins, |a| a.id == id, at))
    }

    async fn count_admins_for_shop(&mut self, shop_id: Uuid) -> Result<i64, DatabaseError> {
        let count = self
            .admins
            .iter()
            .filter(|a| a.is_live() && a.runs_shop(shop_id))
            .count();
        Ok(count as i64)
    }

    async fn detach_admins(&mut self, shop_id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let mut affected = 0;
        for admin in self.admins.iter_mut().filter(|a| a.is_live() && a.runs_shop(shop_id)) {
            admin.shop_id = None;
            admin.updated_at = at;
            affected += 1;
        }
        Ok(affected)
    }

    async fn insert_shop(&mut self, shop: &Shop) -> Result<(), DatabaseError> {
        self.shops.push(shop.clone());
        Ok(())
    }

    async fn find_shop(&mut self, id: Uuid) -> Result<Option<Shop>, DatabaseError> {
        Ok(find(&self.shops, id))
    }

    async fn list_shops(&mut self, limit: i64) -> Result<Vec<Shop>, DatabaseError> {
        Ok(list(self.shops.iter(), limit))
    }

    async fn update_shop(&mut self, shop: &Shop) -> Result<u64, DatabaseError> {
        Ok(replace(&mut self.shops, shop))
    }

    // Units already hold the whole table set
    async fn lock_shop(&mut self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(find(&self.shops, id).is_some())
    }

    async fn delete_shop(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        Ok(soft_delete(&mut self.shops, |s| s.id == id, at))
    }

    async fn insert_product(&mut self, product: &Product) -> Result<(), DatabaseError> {
        self.products.push(product.clone());
        Ok(())
    }

    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        Ok(find(&self.products, id))
    }

    async fn list_products(&mut self, limit: i64) -> Result<Vec<Product>, DatabaseError> {
        Ok(list(self.products.iter(), limit))
    }

    async fn list_products_by_shop(&mut self, shop_id: Uuid, limit: i64) -> Result<Vec<Product>, DatabaseError> {
        Ok(list(self.products.iter().filter(|p| p.shop_id == shop_id), limit))
    }

    async fn update_product(&mut self, product: &Product) -> Result<u64, DatabaseError> {
        Ok(replace(&mut self.products, product))
    }

    async fn delete_product(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        Ok(soft_delete(&mut self.products, |p| p.id == id, at))
    }

    async fn delete_products_by_shop(&mut self, shop_id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        Ok(soft_delete(&mut self.products, |p| p.shop_id == shop_id, at))
    }

    async fn insert_order(&mut self, order: &Order, product_ids: &[Uuid]) -> Result<(), DatabaseError> {
        self.orders.push(order.clone());
        self.order_items.insert(order.id, product_ids.to_vec());
        Ok(())
    }

    async fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DatabaseError> {
        Ok(find(&self.orders, id))
    }

    async fn list_orders(&mut self, limit: i64) -> Result<Vec<Order>, DatabaseError> {
        Ok(list(self.orders.iter(), limit))
    }

    async fn list_orders_by_student(&mut self, student_id: Uuid, limit: i64) -> Result<Vec<Order>, DatabaseError> {
        Ok(list(self.orders.iter().filter(|o| o.student_id == student_id), limit))
    }

    async fn list_orders_by_shop(&mut self, shop_id: Uuid, limit: i64) -> Result<Vec<Order>, DatabaseError> {
        Ok(list(self.orders.iter().filter(|o| o.shop_id == shop_id), limit))
    }

    async fn update_order(&mut self, order: &Order) -> Result<u64, DatabaseError> {
        Ok(replace(&mut self.orders, order))
    }

    async fn delete_order(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        Ok(soft_delete(&mut self.orders, |o| o.id == id, at))
    }

    async fn order_products(&mut self, order_id: Uuid) -> Result<Vec<Product>, DatabaseError> {
        let ids = self.order_items.get(&order_id).cloned().unwrap_or_default();
        Ok(ids
            .into_iter()
            .filter_map(|id| self.products.iter().find(|p| p.id == id).cloned())
            .collect())
    }
}
