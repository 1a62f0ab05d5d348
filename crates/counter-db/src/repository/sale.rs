//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! Sales are immutable once created: this repository has no update or
//! delete path, and corrections happen through compensating records. Lines
//! carry the unit price snapshot frozen when the product entered the cart.

use sqlx::SqlitePool;
use tracing::debug;

use counter_core::{Sale, SaleLine};

use crate::error::{DbError, DbResult};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale.
    pub async fn insert_sale(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, total = %sale.total_cents, tag = %sale.payment_tag, "inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, client_id, operator_id, total_cents, payment_tag, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.client_id)
        .bind(&sale.operator_id)
        .bind(sale.total_cents)
        .bind(&sale.payment_tag)
        .bind(sale.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts all line items of a sale in one transaction.
    ///
    /// The batch is atomic with itself; it remains a separate step from the
    /// sale insert in the checkout sequence.
    pub async fn insert_lines(&self, lines: &[SaleLine]) -> DbResult<()> {
        debug!(count = lines.len(), "inserting sale lines");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (id, sale_id, product_id, quantity, unit_price_cents, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&line.id)
            .bind(&line.sale_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, client_id, operator_id, total_cents, payment_tag, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all line items of a sale, in insertion order.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents, created_at
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists a client's sales, most recent first.
    pub async fn list_for_client(&self, client_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, client_id, operator_id, total_cents, payment_tag, created_at
            FROM sales
            WHERE client_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists the most recent sales across all clients.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, client_id, operator_id, total_cents, payment_tag, created_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts sales (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
