//! Metadata store trait and SQLite implementation.

use crate::error::MetadataResult;
use crate::models::{
    AdminRow, OrderFilter, OrderRow, PaymentFilter, PaymentRow, ProductFilter, ProductRow, UserRow,
};
use crate::repos::{AdminRepo, OrderRepo, PaymentRepo, ProductRepo, UserRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore:
    ProductRepo + OrderRepo + PaymentRepo + UserRepo + AdminRepo + Send + Sync
{
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under axum concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                product_id BLOB PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                brand TEXT NOT NULL,
                material TEXT NOT NULL,
                colors_json TEXT NOT NULL DEFAULT '[]',
                sizes_json TEXT NOT NULL DEFAULT '[]',
                price REAL NOT NULL,
                mrp REAL NOT NULL,
                stock INTEGER NOT NULL,
                images_json TEXT NOT NULL DEFAULT '[]',
                special_feature TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                is_featured INTEGER NOT NULL DEFAULT 0,
                slug TEXT NOT NULL,
                sku TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                order_id BLOB PRIMARY KEY,
                order_number TEXT NOT NULL UNIQUE,
                user_id BLOB,
                customer_name TEXT NOT NULL,
                customer_email TEXT NOT NULL,
                items_json TEXT NOT NULL DEFAULT '[]',
                total_amount REAL NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payments (
                payment_id BLOB PRIMARY KEY,
                payment_ref TEXT NOT NULL UNIQUE,
                order_id BLOB NOT NULL,
                user_id BLOB,
                amount REAL NOT NULL,
                method TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                transaction_id TEXT,
                gateway TEXT NOT NULL,
                fees REAL NOT NULL DEFAULT 0,
                processed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id BLOB PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                mobile TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                last_login TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS admins (
                admin_id BLOB PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'admin',
                mobile TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                last_login TEXT,
                reset_token TEXT,
                reset_token_expires_at TEXT,
                otp_code TEXT,
                otp_expires_at TEXT,
                otp_attempts INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Build the WHERE fragment and bind values for a product filter.
fn product_filter_clause(filter: &ProductFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    if let Some(category) = &filter.category {
        clauses.push("category LIKE ?".to_string());
        binds.push(category.clone());
    }
    if filter.featured_only {
        clauses.push("is_featured = 1".to_string());
    }
    if let Some(search) = &filter.search {
        clauses.push(
            "(name LIKE '%' || ? || '%' OR category LIKE '%' || ? || '%' \
             OR brand LIKE '%' || ? || '%' OR description LIKE '%' || ? || '%' \
             OR sku LIKE '%' || ? || '%')"
                .to_string(),
        );
        for _ in 0..5 {
            binds.push(search.clone());
        }
    }

    let clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (clause, binds)
}

#[async_trait]
impl ProductRepo for SqliteStore {
    async fn create_product(&self, product: &ProductRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                product_id, name, description, category, brand, material,
                colors_json, sizes_json, price, mrp, stock, images_json,
                special_feature, is_active, is_featured, slug, sku,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.product_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(&product.material)
        .bind(&product.colors_json)
        .bind(&product.sizes_json)
        .bind(product.price)
        .bind(product.mrp)
        .bind(product.stock)
        .bind(&product.images_json)
        .bind(&product.special_feature)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(&product.slug)
        .bind(&product.sku)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_product(&self, product_id: Uuid) -> MetadataResult<Option<ProductRow>> {
        let row =
            sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE product_id = ?")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn update_product(&self, product: &ProductRow) -> MetadataResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, description = ?, category = ?, brand = ?, material = ?,
                colors_json = ?, sizes_json = ?, price = ?, mrp = ?, stock = ?,
                images_json = ?, special_feature = ?, is_active = ?, is_featured = ?,
                slug = ?, sku = ?, updated_at = ?
            WHERE product_id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(&product.material)
        .bind(&product.colors_json)
        .bind(&product.sizes_json)
        .bind(product.price)
        .bind(product.mrp)
        .bind(product.stock)
        .bind(&product.images_json)
        .bind(&product.special_feature)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(&product.slug)
        .bind(&product.sku)
        .bind(product.updated_at)
        .bind(product.product_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&self, product_id: Uuid) -> MetadataResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = ?")
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> MetadataResult<Vec<ProductRow>> {
        let (clause, binds) = product_filter_clause(filter);
        let sql = format!(
            "SELECT * FROM products {clause} ORDER BY created_at DESC LIMIT ? OFFSET ?"
        );
        let mut query = sqlx::query_as::<_, ProductRow>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count_products(&self, filter: &ProductFilter) -> MetadataResult<i64> {
        let (clause, binds) = product_filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM products {clause}");
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let count = query.fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn latest_products(&self, limit: i64) -> MetadataResult<Vec<ProductRow>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Build the WHERE fragment and bind values for an order filter.
fn order_filter_clause(filter: &OrderFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    if let Some(status) = &filter.status {
        clauses.push("status = ?".to_string());
        binds.push(status.clone());
    }
    if let Some(search) = &filter.search {
        clauses.push(
            "(order_number LIKE '%' || ? || '%' OR customer_name LIKE '%' || ? || '%' \
             OR customer_email LIKE '%' || ? || '%')"
                .to_string(),
        );
        for _ in 0..3 {
            binds.push(search.clone());
        }
    }

    let clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (clause, binds)
}

#[async_trait]
impl OrderRepo for SqliteStore {
    async fn create_order(&self, order: &OrderRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                order_id, order_number, user_id, customer_name, customer_email,
                items_json, total_amount, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.order_id)
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.items_json)
        .bind(order.total_amount)
        .bind(&order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_order(&self, order_id: Uuid) -> MetadataResult<Option<OrderRow>> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: &str,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<bool> {
        let result =
            sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE order_id = ?")
                .bind(status)
                .bind(updated_at)
                .bind(order_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_order(&self, order_id: Uuid) -> MetadataResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = ?")
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        offset: i64,
        limit: i64,
    ) -> MetadataResult<Vec<OrderRow>> {
        let (clause, binds) = order_filter_clause(filter);
        let sql =
            format!("SELECT * FROM orders {clause} ORDER BY created_at DESC LIMIT ? OFFSET ?");
        let mut query = sqlx::query_as::<_, OrderRow>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count_orders(&self, filter: &OrderFilter) -> MetadataResult<i64> {
        let (clause, binds) = order_filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM orders {clause}");
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let count = query.fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn recent_orders(&self, limit: i64) -> MetadataResult<Vec<OrderRow>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn total_revenue(&self) -> MetadataResult<f64> {
        let total: Option<f64> =
            sqlx::query_scalar("SELECT SUM(total_amount) FROM orders")
                .fetch_one(&self.pool)
                .await?;
        Ok(total.unwrap_or(0.0))
    }
}

/// Build the WHERE fragment and bind values for a payment filter.
fn payment_filter_clause(filter: &PaymentFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    if let Some(status) = &filter.status {
        clauses.push("status = ?".to_string());
        binds.push(status.clone());
    }
    if let Some(method) = &filter.method {
        clauses.push("method = ?".to_string());
        binds.push(method.clone());
    }
    if let Some(search) = &filter.search {
        clauses.push(
            "(payment_ref LIKE '%' || ? || '%' OR transaction_id LIKE '%' || ? || '%')"
                .to_string(),
        );
        for _ in 0..2 {
            binds.push(search.clone());
        }
    }

    let clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (clause, binds)
}

#[async_trait]
impl PaymentRepo for SqliteStore {
    async fn create_payment(&self, payment: &PaymentRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, payment_ref, order_id, user_id, amount, method,
                status, transaction_id, gateway, fees, processed_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.payment_id)
        .bind(&payment.payment_ref)
        .bind(payment.order_id)
        .bind(payment.user_id)
        .bind(payment.amount)
        .bind(&payment.method)
        .bind(&payment.status)
        .bind(&payment.transaction_id)
        .bind(&payment.gateway)
        .bind(payment.fees)
        .bind(payment.processed_at)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_payment(&self, payment_id: Uuid) -> MetadataResult<Option<PaymentRow>> {
        let row =
            sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments WHERE payment_id = ?")
                .bind(payment_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: &str,
        processed_at: Option<OffsetDateTime>,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<bool> {
        let result = sqlx::query(
            "UPDATE payments SET status = ?, processed_at = COALESCE(?, processed_at), \
             updated_at = ? WHERE payment_id = ?",
        )
        .bind(status)
        .bind(processed_at)
        .bind(updated_at)
        .bind(payment_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_payments(
        &self,
        filter: &PaymentFilter,
        offset: i64,
        limit: i64,
    ) -> MetadataResult<Vec<PaymentRow>> {
        let (clause, binds) = payment_filter_clause(filter);
        let sql =
            format!("SELECT * FROM payments {clause} ORDER BY created_at DESC LIMIT ? OFFSET ?");
        let mut query = sqlx::query_as::<_, PaymentRow>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count_payments(&self, filter: &PaymentFilter) -> MetadataResult<i64> {
        let (clause, binds) = payment_filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM payments {clause}");
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let count = query.fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn next_payment_ref(&self) -> MetadataResult<String> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await?;
        Ok(format!("PAY{:04}", count + 1))
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn create_user(&self, user: &UserRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id, name, email, password_hash, role, mobile,
                is_active, last_login, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(&user.mobile)
        .bind(user.is_active)
        .bind(user.last_login)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_user_by_email(&self, email: &str) -> MetadataResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE lower(email) = lower(?)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_users(&self, offset: i64, limit: i64) -> MetadataResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_users(&self) -> MetadataResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role != 'admin'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> MetadataResult<bool> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(is_active)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AdminRepo for SqliteStore {
    async fn create_admin(&self, admin: &AdminRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admins (
                admin_id, name, email, password_hash, role, mobile, is_active,
                last_login, reset_token, reset_token_expires_at, otp_code,
                otp_expires_at, otp_attempts, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(admin.admin_id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(&admin.role)
        .bind(&admin.mobile)
        .bind(admin.is_active)
        .bind(admin.last_login)
        .bind(&admin.reset_token)
        .bind(admin.reset_token_expires_at)
        .bind(&admin.otp_code)
        .bind(admin.otp_expires_at)
        .bind(admin.otp_attempts)
        .bind(admin.created_at)
        .bind(admin.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_admin(&self, admin_id: Uuid) -> MetadataResult<Option<AdminRow>> {
        let row = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE admin_id = ?")
            .bind(admin_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_admin_by_email(&self, email: &str) -> MetadataResult<Option<AdminRow>> {
        let row =
            sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE lower(email) = lower(?)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn any_admin_exists(&self) -> MetadataResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn count_admins(&self) -> MetadataResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_active_admins(&self) -> MetadataResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn record_admin_login(&self, admin_id: Uuid, at: OffsetDateTime) -> MetadataResult<()> {
        sqlx::query("UPDATE admins SET last_login = ?, updated_at = ? WHERE admin_id = ?")
            .bind(at)
            .bind(at)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_admin_password(
        &self,
        admin_id: Uuid,
        password_hash: &str,
    ) -> MetadataResult<()> {
        sqlx::query("UPDATE admins SET password_hash = ?, updated_at = ? WHERE admin_id = ?")
            .bind(password_hash)
            .bind(OffsetDateTime::now_utc())
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        admin_id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> MetadataResult<()> {
        sqlx::query(
            "UPDATE admins SET reset_token = ?, reset_token_expires_at = ? WHERE admin_id = ?",
        )
        .bind(token)
        .bind(expires_at)
        .bind(admin_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_admin_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> MetadataResult<Option<AdminRow>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT * FROM admins WHERE reset_token = ? AND reset_token_expires_at > ?",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn clear_reset_token(&self, admin_id: Uuid) -> MetadataResult<()> {
        sqlx::query(
            "UPDATE admins SET reset_token = NULL, reset_token_expires_at = NULL \
             WHERE admin_id = ?",
        )
        .bind(admin_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_otp(
        &self,
        admin_id: Uuid,
        code: &str,
        expires_at: OffsetDateTime,
    ) -> MetadataResult<()> {
        sqlx::query(
            "UPDATE admins SET otp_code = ?, otp_expires_at = ?, otp_attempts = 0 \
             WHERE admin_id = ?",
        )
        .bind(code)
        .bind(expires_at)
        .bind(admin_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_admin_by_otp(
        &self,
        email: &str,
        code: &str,
        now: OffsetDateTime,
    ) -> MetadataResult<Option<AdminRow>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT * FROM admins WHERE lower(email) = lower(?) AND otp_code = ? \
             AND otp_expires_at > ?",
        )
        .bind(email)
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn increment_otp_attempts(&self, admin_id: Uuid) -> MetadataResult<()> {
        sqlx::query("UPDATE admins SET otp_attempts = otp_attempts + 1 WHERE admin_id = ?")
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_otp(&self, admin_id: Uuid) -> MetadataResult<()> {
        sqlx::query(
            "UPDATE admins SET otp_code = NULL, otp_expires_at = NULL, otp_attempts = 0 \
             WHERE admin_id = ?",
        )
        .bind(admin_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductFilter;

    async fn store() -> (tempfile::TempDir, SqliteStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(temp.path().join("backroom.db"))
            .await
            .unwrap();
        (temp, store)
    }

    fn product(name: &str) -> ProductRow {
        let now = OffsetDateTime::now_utc();
        ProductRow {
            product_id: Uuid::new_v4(),
            name: name.to_string(),
            description: "A test product".to_string(),
            category: "rugs".to_string(),
            brand: "Royal Thread".to_string(),
            material: "cotton".to_string(),
            colors_json: "[]".to_string(),
            sizes_json: "[]".to_string(),
            price: 19.99,
            mrp: 24.99,
            stock: 5,
            images_json: "[]".to_string(),
            special_feature: String::new(),
            is_active: true,
            is_featured: false,
            slug: name.to_lowercase().replace(' ', "-"),
            sku: format!("SKU-{name}"),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn product_crud_roundtrip() {
        let (_temp, store) = store().await;
        let mut row = product("Blue Rug");
        store.create_product(&row).await.unwrap();

        let fetched = store.get_product(row.product_id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Blue Rug");

        row.stock = 2;
        assert!(store.update_product(&row).await.unwrap());
        let fetched = store.get_product(row.product_id).await.unwrap().unwrap();
        assert_eq!(fetched.stock, 2);

        assert!(store.delete_product(row.product_id).await.unwrap());
        assert!(!store.delete_product(row.product_id).await.unwrap());
        assert!(store.get_product(row.product_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn product_search_filter_matches_name_and_sku() {
        let (_temp, store) = store().await;
        store.create_product(&product("Blue Rug")).await.unwrap();
        store.create_product(&product("Red Towel")).await.unwrap();

        let filter = ProductFilter {
            search: Some("blue".to_string()),
            ..Default::default()
        };
        assert_eq!(store.count_products(&filter).await.unwrap(), 1);
        let rows = store.list_products(&filter, 0, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Blue Rug");

        assert_eq!(
            store.count_products(&ProductFilter::default()).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn payment_ref_sequence() {
        let (_temp, store) = store().await;
        assert_eq!(store.next_payment_ref().await.unwrap(), "PAY0001");

        let now = OffsetDateTime::now_utc();
        let payment = PaymentRow {
            payment_id: Uuid::new_v4(),
            payment_ref: "PAY0001".to_string(),
            order_id: Uuid::new_v4(),
            user_id: None,
            amount: 10.0,
            method: "UPI".to_string(),
            status: "pending".to_string(),
            transaction_id: None,
            gateway: "Razorpay".to_string(),
            fees: 0.0,
            processed_at: None,
            created_at: now,
            updated_at: now,
        };
        store.create_payment(&payment).await.unwrap();
        assert_eq!(store.next_payment_ref().await.unwrap(), "PAY0002");
    }

    #[tokio::test]
    async fn admin_otp_state_transitions() {
        let (_temp, store) = store().await;
        let now = OffsetDateTime::now_utc();
        let admin = AdminRow {
            admin_id: Uuid::new_v4(),
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: "admin".to_string(),
            mobile: None,
            is_active: true,
            last_login: None,
            reset_token: None,
            reset_token_expires_at: None,
            otp_code: None,
            otp_expires_at: None,
            otp_attempts: 0,
            created_at: now,
            updated_at: now,
        };
        store.create_admin(&admin).await.unwrap();
        assert!(store.any_admin_exists().await.unwrap());

        store
            .set_otp(admin.admin_id, "123456", now + time::Duration::minutes(10))
            .await
            .unwrap();

        // Case-insensitive email match with a valid, unexpired code.
        let found = store
            .get_admin_by_otp("ROOT@example.com", "123456", now)
            .await
            .unwrap();
        assert!(found.is_some());

        // Wrong code does not match; attempts accumulate independently.
        assert!(
            store
                .get_admin_by_otp("root@example.com", "000000", now)
                .await
                .unwrap()
                .is_none()
        );
        store.increment_otp_attempts(admin.admin_id).await.unwrap();
        let row = store.get_admin(admin.admin_id).await.unwrap().unwrap();
        assert_eq!(row.otp_attempts, 1);

        store.clear_otp(admin.admin_id).await.unwrap();
        let row = store.get_admin(admin.admin_id).await.unwrap().unwrap();
        assert!(row.otp_code.is_none());
        assert_eq!(row.otp_attempts, 0);
    }
}
