use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{DatabaseError, DatabaseManager, Store, Tables, UnitOfWork};
use crate::models::{Admin, Order, Product, Shop, Student};

/// Postgres-backed store. Each unit of work is one transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

struct PgUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnit {
    fn tables(&mut self) -> &mut dyn Tables {
        &mut *self.tx
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnit { tx }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[async_trait]
impl Tables for PgConnection {
    async fn insert_student(&mut self, s: &Student) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO students (id, email, password, verified, first_name, last_name, birth_date, \
             university, mobile_number, country, grad_year, points, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(s.id)
        .bind(&s.account.email)
        .bind(&s.account.password)
        .bind(s.account.verified)
        .bind(&s.first_name)
        .bind(&s.last_name)
        .bind(s.birth_date)
        .bind(&s.university)
        .bind(&s.mobile_number)
        .bind(&s.country)
        .bind(s.grad_year)
        .bind(s.points)
        .bind(s.created_at)
        .bind(s.updated_at)
        .execute(&mut *self)
        .await?;
        Ok(())
    }

    async fn find_student(&mut self, id: Uuid) -> Result<Option<Student>, DatabaseError> {
        let row = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;
        Ok(row)
    }

    async fn find_student_by_email(&mut self, email: &str) -> Result<Option<Student>, DatabaseError> {
        let row = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE email = $1 AND deleted_at IS NULL")
            .bind(email)
            .fetch_optional(&mut *self)
            .await?;
        Ok(row)
    }

    async fn list_students(&mut self, limit: i64) -> Result<Vec<Student>, DatabaseError> {
        let rows = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE deleted_at IS NULL ORDER BY created_at, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&mut *self)
        .await?;
        Ok(rows)
    }

    async fn update_student(&mut self, s: &Student) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE students SET email = $2, password = $3, verified = $4, first_name = $5, last_name = $6, \
             birth_date = $7, university = $8, mobile_number = $9, country = $10, grad_year = $11, \
             points = $12, updated_at = $13 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(s.id)
        .bind(&s.account.email)
        .bind(&s.account.password)
        .bind(s.account.verified)
        .bind(&s.first_name)
        .bind(&s.last_name)
        .bind(s.birth_date)
        .bind(&s.university)
        .bind(&s.mobile_number)
        .bind(&s.country)
        .bind(s.grad_year)
        .bind(s.points)
        .bind(s.updated_at)
        .execute(&mut *self)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_student(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        soft_delete(self, "UPDATE students SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL", id, at).await
    }

    async fn insert_admin(&mut self, a: &Admin) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO admins (id, email, password, verified, first_name, last_name, shop_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(a.id)
        .bind(&a.account.email)
        .bind(&a.account.password)
        .bind(a.account.verified)
        .bind(&a.first_name)
        .bind(&a.last_name)
        .bind(a.shop_id)
        .bind(a.created_at)
        .bind(a.updated_at)
        .execute(&mut *self)
        .await?;
        Ok(())
    }

    async fn find_admin(&mut self, id: Uuid) -> Result<Option<Admin>, DatabaseError> {
        let row = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;
        Ok(row)
    }

    async fn find_admin_by_email(&mut self, email: &str) -> Result<Option<Admin>, DatabaseError> {
        let row = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = $1 AND deleted_at IS NULL")
            .bind(email)
            .fetch_optional(&mut *self)
            .await?;
        Ok(row)
    }

    async fn list_admins(&mut self, limit: i64) -> Result<Vec<Admin>, DatabaseError> {
        let rows = sqlx::query_as::<_, Admin>(
            "SELECT * FROM admins WHERE deleted_at IS NULL ORDER BY created_at, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&mut *self)
        .await?;
        Ok(rows)
    }

    async fn update_admin(&mut self, a: &Admin) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE admins SET email = $2, password = $3, verified = $4, first_name = $5, last_name = $6, \
             shop_id = $7, updated_at = $8 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(a.id)
        .bind(&a.account.email)
        .bind(&a.account.password)
        .bind(a.account.verified)
        .bind(&a.first_name)
        .bind(&a.last_name)
        .bind(a.shop_id)
        .bind(a.updated_at)
        .execute(&mut *self)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_admin(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        soft_delete(self, "UPDATE admins SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL", id, at).await
    }

    async fn count_admins_for_shop(&mut self, shop_id: Uuid) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE shop_id = $1 AND deleted_at IS NULL")
            .bind(shop_id)
            .fetch_one(&mut *self)
            .await?;
        Ok(count)
    }

    async fn detach_admins(&mut self, shop_id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        soft_delete(
            self,
            "UPDATE admins SET shop_id = NULL, updated_at = $2 WHERE shop_id = $1 AND deleted_at IS NULL",
            shop_id,
            at,
        )
        .await
    }

    async fn insert_shop(&mut self, s: &Shop) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO shops (id, name, description, logo_link, latitude, longitude, postcode, address_1, \
             town_or_city, number, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(s.id)
        .bind(&s.name)
        .bind(&s.description)
        .bind(&s.logo_link)
        .bind(s.latitude)
        .bind(s.longitude)
        .bind(&s.postcode)
        .bind(&s.address_1)
        .bind(&s.town_or_city)
        .bind(s.number)
        .bind(s.created_at)
        .bind(s.updated_at)
        .execute(&mut *self)
        .await?;
        Ok(())
    }

    async fn find_shop(&mut self, id: Uuid) -> Result<Option<Shop>, DatabaseError> {
        let row = sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;
        Ok(row)
    }

    async fn list_shops(&mut self, limit: i64) -> Result<Vec<Shop>, DatabaseError> {
        let rows = sqlx::query_as::<_, Shop>(
            "SELECT * FROM shops WHERE deleted_at IS NULL ORDER BY created_at, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&mut *self)
        .await?;
        Ok(rows)
    }

    async fn lock_shop(&mut self, id: Uuid) -> Result<bool, DatabaseError> {
        let row: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM shops WHERE id = $1 AND deleted_at IS NULL FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *self)
                .await?;
        Ok(row.is_some())
    }

    async fn update_shop(&mut self, s: &Shop) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE shops SET name = $2, description = $3, logo_link = $4, latitude = $5, longitude = $6, \
             postcode = $7, address_1 = $8, town_or_city = $9, number = $10, updated_at = $11 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(s.id)
        .bind(&s.name)
        .bind(&s.description)
        .bind(&s.logo_link)
        .bind(s.latitude)
        .bind(s.longitude)
        .bind(&s.postcode)
        .bind(&s.address_1)
        .bind(&s.town_or_city)
        .bind(s.number)
        .bind(s.updated_at)
        .execute(&mut *self)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_shop(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        soft_delete(self, "UPDATE shops SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL", id, at).await
    }

    async fn insert_product(&mut self, p: &Product) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO products (id, name, description, code, price, currency, is_in_sale, discount, \
             discount_unit, reward, shop_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(p.id)
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.code)
        .bind(p.price)
        .bind(&p.currency)
        .bind(p.is_in_sale)
        .bind(p.discount)
        .bind(&p.discount_unit)
        .bind(p.reward)
        .bind(p.shop_id)
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(&mut *self)
        .await?;
        Ok(())
    }

    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        let row = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;
        Ok(row)
    }

    async fn list_products(&mut self, limit: i64) -> Result<Vec<Product>, DatabaseError> {
        let rows = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE deleted_at IS NULL ORDER BY created_at, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&mut *self)
        .await?;
        Ok(rows)
    }

    async fn list_products_by_shop(&mut self, shop_id: Uuid, limit: i64) -> Result<Vec<Product>, DatabaseError> {
        let rows = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE shop_id = $1 AND deleted_at IS NULL ORDER BY created_at, id LIMIT $2",
        )
        .bind(shop_id)
        .bind(limit)
        .fetch_all(&mut *self)
        .await?;
        Ok(rows)
    }

    async fn update_product(&mut self, p: &Product) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE products SET name = $2, description = $3, code = $4, price = $5, currency = $6, \
             is_in_sale = $7, discount = $8, discount_unit = $9, reward = $10, updated_at = $11 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(p.id)
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.code)
        .bind(p.price)
        .bind(&p.currency)
        .bind(p.is_in_sale)
        .bind(p.discount)
        .bind(&p.discount_unit)
        .bind(p.reward)
        .bind(p.updated_at)
        .execute(&mut *self)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_product(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        soft_delete(self, "UPDATE products SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL", id, at).await
    }

    async fn delete_products_by_shop(&mut self, shop_id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        soft_delete(
            self,
            "UPDATE products SET deleted_at = $2 WHERE shop_id = $1 AND deleted_at IS NULL",
            shop_id,
            at,
        )
        .await
    }

    async fn insert_order(&mut self, o: &Order, product_ids: &[Uuid]) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO orders (id, student_id, shop_id, total_price, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(o.id)
        .bind(o.student_id)
        .bind(o.shop_id)
        .bind(o.total_price)
        .bind(o.status)
        .bind(o.created_at)
        .bind(o.updated_at)
        .execute(&mut *self)
        .await?;

        for (position, product_id) in product_ids.iter().enumerate() {
            sqlx::query("INSERT INTO order_items (order_id, product_id, position) VALUES ($1, $2, $3)")
                .bind(o.id)
                .bind(product_id)
                .bind(position as i32)
                .execute(&mut *self)
                .await?;
        }
        Ok(())
    }

    async fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DatabaseError> {
        let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;
        Ok(row)
    }

    async fn list_orders(&mut self, limit: i64) -> Result<Vec<Order>, DatabaseError> {
        let rows = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE deleted_at IS NULL ORDER BY created_at, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&mut *self)
        .await?;
        Ok(rows)
    }

    async fn list_orders_by_student(&mut self, student_id: Uuid, limit: i64) -> Result<Vec<Order>, DatabaseError> {
        let rows = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE student_id = $1 AND deleted_at IS NULL ORDER BY created_at, id LIMIT $2",
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(&mut *self)
        .await?;
        Ok(rows)
    }

    async fn list_orders_by_shop(&mut self, shop_id: Uuid, limit: i64) -> Result<Vec<Order>, DatabaseError> {
        let rows = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE shop_id = $1 AND deleted_at IS NULL ORDER BY created_at, id LIMIT $2",
        )
        .bind(shop_id)
        .bind(limit)
        .fetch_all(&mut *self)
        .await?;
        Ok(rows)
    }

    async fn update_order(&mut self, o: &Order) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 AND deleted_at IS NULL")
            .bind(o.id)
            .bind(o.status)
            .bind(o.updated_at)
            .execute(&mut *self)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_order(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<u64, DatabaseError> {
        soft_delete(self, "UPDATE orders SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL", id, at).await
    }

    async fn order_products(&mut self, order_id: Uuid) -> Result<Vec<Product>, DatabaseError> {
        let rows = sqlx::query_as::<_, Product>(
            "SELECT p.* FROM order_items i JOIN products p ON p.id = i.product_id \
             WHERE i.order_id = $1 ORDER BY i.position",
        )
        .bind(order_id)
        .fetch_all(&mut *self)
        .await?;
        Ok(rows)
    }
}

/// Runs a `$1 = id, $2 = timestamp` update and reports the rows it touched
async fn soft_delete(
    conn: &mut PgConnection,
    sql: &'static str,
    id: Uuid,
    at: DateTime<Utc>,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(sql).bind(id).bind(at).execute(conn).await?;
    Ok(result.rows_affected())
}
