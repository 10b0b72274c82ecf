//! # Sale Repository
//!
//! Read-side access to sales, their items and payments, plus the
//! transaction-scoped writes the sale engine composes.
//!
//! The repository never decides anything: status transitions, totals and
//! settlement all belong to the engine. What lives here is row access and
//! the derived `paid` sum (payments are the source of truth; `paid` is
//! never stored).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use atlas_core::{Money, Payment, Sale, SaleItem, SaleStatus};

/// A fully hydrated sale: the row, its lines, its payment trail and the
/// derived settlement figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleAggregate {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payments: Vec<Payment>,
    /// Σ payments.amount - derived, never stored.
    pub paid_cents: i64,
    /// max(0, paid − total) - derived, never stored.
    pub change_cents: i64,
}

impl SaleAggregate {
    pub(crate) fn assemble(sale: Sale, items: Vec<SaleItem>, payments: Vec<Payment>) -> Self {
        let paid: i64 = payments.iter().map(|p| p.amount_cents).sum();
        let change = Money::from_cents(paid)
            .sub_clamped(Money::from_cents(sale.total_cents))
            .cents();
        SaleAggregate {
            sale,
            items,
            payments,
            paid_cents: paid,
            change_cents: change,
        }
    }
}

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

    /// Gets a sale row by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, store_id, session_id, seller_id, customer_id,
                global_discount_cents, global_surcharge_cents,
                subtotal_cents, total_cents, status,
                created_at, updated_at, cancelled_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                id, sale_id, variation_id, quantity, unit_price_cents,
                item_discount_cents, item_surcharge_cents, line_total_cents,
                created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets all payments for a sale, oldest first.
    pub async fn get_payments(&self, sale_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, sale_id, method, amount_cents, created_at
            FROM payments
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Gets total amount paid for a sale.
    pub async fn get_total_paid(&self, sale_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_cents) FROM payments WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }

    /// Hydrates the full aggregate for a sale.
    pub async fn get_aggregate(&self, sale_id: &str) -> DbResult<Option<SaleAggregate>> {
        let Some(sale) = self.get_by_id(sale_id).await? else {
            return Ok(None);
        };
        let items = self.get_items(sale_id).await?;
        let payments = self.get_payments(sale_id).await?;

        Ok(Some(SaleAggregate::assemble(sale, items, payments)))
    }
}

// =============================================================================
// Transaction-Scoped Operations
// =============================================================================

/// Fetches a sale row inside an open transaction.
pub(crate) async fn fetch_sale_in(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT
            id, store_id, session_id, seller_id, customer_id,
            global_discount_cents, global_surcharge_cents,
            subtotal_cents, total_cents, status,
            created_at, updated_at, cancelled_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

/// Fetches a sale's items inside an open transaction.
pub(crate) async fn fetch_items_in(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        r#"
        SELECT
            id, sale_id, variation_id, quantity, unit_price_cents,
            item_discount_cents, item_surcharge_cents, line_total_cents,
            created_at
        FROM sale_items
        WHERE sale_id = ?1
        ORDER BY created_at
        "#,
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Inserts a sale row.
pub(crate) async fn insert_sale_in(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, status = %sale.status.as_str(), "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, store_id, session_id, seller_id, customer_id,
            global_discount_cents, global_surcharge_cents,
            subtotal_cents, total_cents, status,
            created_at, updated_at, cancelled_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.store_id)
    .bind(&sale.session_id)
    .bind(&sale.seller_id)
    .bind(&sale.customer_id)
    .bind(sale.global_discount_cents)
    .bind(sale.global_surcharge_cents)
    .bind(sale.subtotal_cents)
    .bind(sale.total_cents)
    .bind(sale.status)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .bind(sale.cancelled_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts a sale item.
pub(crate) async fn insert_item_in(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, variation_id, quantity, unit_price_cents,
            item_discount_cents, item_surcharge_cents, line_total_cents,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.variation_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.item_discount_cents)
    .bind(item.item_surcharge_cents)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Records a payment (append-only; payments are never edited or deleted).
pub(crate) async fn insert_payment_in(
    conn: &mut SqliteConnection,
    payment: &Payment,
) -> DbResult<()> {
    debug!(sale_id = %payment.sale_id, amount = %payment.amount_cents, "Recording payment");

    sqlx::query(
        r#"
        INSERT INTO payments (id, sale_id, method, amount_cents, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.sale_id)
    .bind(payment.method)
    .bind(payment.amount_cents)
    .bind(payment.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Total paid for a sale, inside an open transaction.
pub(crate) async fn total_paid_in(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<i64> {
    let total: Option<i64> =
        sqlx::query_scalar("SELECT SUM(amount_cents) FROM payments WHERE sale_id = ?1")
            .bind(sale_id)
            .fetch_one(&mut *conn)
            .await?;

    Ok(total.unwrap_or(0))
}

/// Sets a sale's status (engine-decided; the repository applies it blindly).
pub(crate) async fn set_status_in(
    conn: &mut SqliteConnection,
    sale_id: &str,
    status: SaleStatus,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query("UPDATE sales SET status = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(sale_id)
        .bind(status)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Guarded cancellation flip. Returns false when the sale was already
/// cancelled, so a concurrent second cancel fails instead of
/// double-restoring stock.
pub(crate) async fn mark_cancelled_in(
    conn: &mut SqliteConnection,
    sale_id: &str,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE sales
        SET status = 'cancelled', cancelled_at = ?2, updated_at = ?2
        WHERE id = ?1 AND status != 'cancelled'
        "#,
    )
    .bind(sale_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
