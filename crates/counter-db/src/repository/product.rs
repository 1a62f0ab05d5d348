//! # Product Repository
//!
//! Database operations for the product catalog and its stock counts.
//!
//! ## Stock Update Strategy
//! ```text
//! Read-then-write loses updates when two counters sell the same product:
//!
//!   Counter A: read 5 ──► write 5 - 3 = 2
//!   Counter B: read 5 ──► write 5 - 2 = 3   (A's sale vanished)
//!
//! Every stock write here is a conditional delta instead:
//!
//!   UPDATE products SET stock_quantity = stock_quantity - N
//!   WHERE id = ? AND stock_quantity >= N
//!
//! Zero rows affected means the floor refused the write; the caller turns
//! that into an insufficient-stock error. The CHECK constraint backstops
//! the invariant.
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use counter_core::Product;

use crate::error::{DbError, DbResult};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Generates the business code assigned to a product at creation time.
    ///
    /// Sequential over the current catalog size (`PRD-00001`, `PRD-00002`,
    /// ...). The UNIQUE index on `code` turns a collision from a concurrent
    /// insert into a duplicate error instead of silent reuse.
    pub async fn next_code(&self) -> DbResult<String> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(format!("PRD-{:05}", count + 1))
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the code already exists.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(code = %product.code, name = %product.name, "inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, name, category, unit,
                price_cents, stock_quantity, min_stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.min_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, unit,
                   price_cents, stock_quantity, min_stock,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, unit,
                   price_cents, stock_quantity, min_stock,
                   created_at, updated_at
            FROM products
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, unit,
                   price_cents, stock_quantity, min_stock,
                   created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates a product's catalog fields.
    ///
    /// Stock is deliberately not written here; every stock change goes
    /// through [`ProductRepository::adjust_stock`] or
    /// [`ProductRepository::debit_stock`] so the floor holds.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                unit = ?4,
                price_cents = ?5,
                min_stock = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.price_cents)
        .bind(product.min_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Applies a signed stock delta (purchases, manual corrections).
    ///
    /// Conditional: the write happens only when the resulting stock stays
    /// at or above zero. Returns whether a row changed; `false` means the
    /// floor refused the delta (or the product does not exist, which the
    /// caller distinguishes with a follow-up read).
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<bool> {
        debug!(id = %id, delta = %delta, "adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?2,
                updated_at = ?3
            WHERE id = ?1 AND stock_quantity + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// The checkout stock decrement.
    ///
    /// Debits `quantity` units only when that many are on hand, in one
    /// statement, so two concurrent checkouts cannot both spend the same
    /// units. Returns whether the debit happened.
    pub async fn debit_stock(&self, id: &str, quantity: i64) -> DbResult<bool> {
        debug!(id = %id, quantity = %quantity, "debiting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - ?2,
                updated_at = ?3
            WHERE id = ?1 AND stock_quantity >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Products at or below their restock threshold, ordered by name.
    pub async fn list_below_min_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, unit,
                   price_cents, stock_quantity, min_stock,
                   created_at, updated_at
            FROM products
            WHERE stock_quantity <= min_stock
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Deletes a product by ID.
    ///
    /// Refused by the store when sale lines still reference the product.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics and code generation).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
