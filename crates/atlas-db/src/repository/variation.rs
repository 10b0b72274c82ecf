//! # Variation Repository (Stock Ledger Adapter)
//!
//! The minimal catalog surface the engines consume: price lookup plus
//! atomic stock reservation and release.
//!
//! ## Atomic Check-Then-Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Stock Reservation Strategy                      │
//! │                                                                     │
//! │  ❌ WRONG: read stock, compare, write (racy - two readers both     │
//! │     see 3 available and both decrement by 3)                        │
//! │                                                                     │
//! │  ✅ CORRECT: one conditional UPDATE                                │
//! │     UPDATE variations SET stock_qty = stock_qty - ?qty              │
//! │     WHERE id = ?id AND stock_qty >= ?qty                            │
//! │                                                                     │
//! │  Zero rows affected means the check failed; the loser reads the     │
//! │  surviving stock level only to report it. SQLite's single writer    │
//! │  serializes the statements, so overselling is impossible.           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbResult, EngineError, EngineResult};
use atlas_core::{CoreError, Variation};

/// Repository for variation database operations.
#[derive(Debug, Clone)]
pub struct VariationRepository {
    pool: SqlitePool,
}

impl VariationRepository {
    /// Creates a new VariationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VariationRepository { pool }
    }

    /// Gets a variation by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Variation>> {
        let variation = sqlx::query_as::<_, Variation>(
            r#"
            SELECT
                id, sku, name, unit_price_cents, stock_qty,
                is_active, created_at, updated_at
            FROM variations
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(variation)
    }

    /// Inserts a new variation (seed and test surface; catalog CRUD proper
    /// lives outside this crate).
    pub async fn insert(&self, variation: &Variation) -> DbResult<()> {
        debug!(sku = %variation.sku, "Inserting variation");

        sqlx::query(
            r#"
            INSERT INTO variations (
                id, sku, name, unit_price_cents, stock_qty,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&variation.id)
        .bind(&variation.sku)
        .bind(&variation.name)
        .bind(variation.unit_price_cents)
        .bind(variation.stock_qty)
        .bind(variation.is_active)
        .bind(variation.created_at)
        .bind(variation.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomically reserves stock for a sale line.
    ///
    /// Standalone form of [`reserve_in`]; the sale engine uses the
    /// transaction-scoped form so a later failure rolls the reservation
    /// back.
    pub async fn reserve(&self, variation_id: &str, qty: i64) -> EngineResult<()> {
        let mut conn = self.pool.acquire().await.map_err(EngineError::from)?;
        reserve_in(&mut conn, variation_id, qty).await
    }

    /// Releases previously reserved stock (used on cancellation).
    pub async fn release(&self, variation_id: &str, qty: i64) -> EngineResult<()> {
        let mut conn = self.pool.acquire().await.map_err(EngineError::from)?;
        release_in(&mut conn, variation_id, qty).await
    }

    /// Counts active variations (for diagnostics and the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM variations WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction-Scoped Operations
// =============================================================================

/// Fetches an active variation inside an open transaction.
pub(crate) async fn fetch_active_in(
    conn: &mut SqliteConnection,
    variation_id: &str,
) -> EngineResult<Variation> {
    let variation = sqlx::query_as::<_, Variation>(
        r#"
        SELECT
            id, sku, name, unit_price_cents, stock_qty,
            is_active, created_at, updated_at
        FROM variations
        WHERE id = ?1 AND is_active = 1
        "#,
    )
    .bind(variation_id)
    .fetch_optional(&mut *conn)
    .await?;

    variation.ok_or_else(|| CoreError::VariationNotFound(variation_id.to_string()).into())
}

/// `Reserve(variationId, qty) -> OK | InsufficientStock`
///
/// Check and decrement happen in one statement; zero rows affected means
/// the stock was short (or the variation is gone), and the caller's
/// transaction rollback undoes any earlier reservations of the same call.
pub(crate) async fn reserve_in(
    conn: &mut SqliteConnection,
    variation_id: &str,
    qty: i64,
) -> EngineResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE variations
        SET stock_qty = stock_qty - ?1, updated_at = ?2
        WHERE id = ?3 AND stock_qty >= ?1
        "#,
    )
    .bind(qty)
    .bind(now)
    .bind(variation_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let available: Option<i64> =
            sqlx::query_scalar("SELECT stock_qty FROM variations WHERE id = ?1")
                .bind(variation_id)
                .fetch_optional(&mut *conn)
                .await?;

        return match available {
            None => Err(CoreError::VariationNotFound(variation_id.to_string()).into()),
            Some(available) => Err(CoreError::InsufficientStock {
                variation_id: variation_id.to_string(),
                available,
                requested: qty,
            }
            .into()),
        };
    }

    debug!(variation_id = %variation_id, qty = %qty, "Stock reserved");
    Ok(())
}

/// `Release(variationId, qty) -> OK`
///
/// Unconditional increment; there is no upper bound beyond the domain's
/// sanity. Fails only if the variation row no longer exists.
pub(crate) async fn release_in(
    conn: &mut SqliteConnection,
    variation_id: &str,
    qty: i64,
) -> EngineResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE variations
        SET stock_qty = stock_qty + ?1, updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(qty)
    .bind(now)
    .bind(variation_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::VariationNotFound(variation_id.to_string()).into());
    }

    debug!(variation_id = %variation_id, qty = %qty, "Stock released");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn variation(stock: i64) -> Variation {
        let now = Utc::now();
        Variation {
            id: Uuid::new_v4().to_string(),
            sku: format!("SKU-{}", Uuid::new_v4()),
            name: "Test Variation".to_string(),
            unit_price_cents: 1000,
            stock_qty: stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_reserve_happy_path() {
        let db = test_db().await;
        let repo = db.variations();
        let v = variation(10);
        repo.insert(&v).await.unwrap();

        repo.reserve(&v.id, 4).await.unwrap();

        let after = repo.get_by_id(&v.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 6);
    }

    #[tokio::test]
    async fn test_reserve_insufficient_stock_leaves_stock_untouched() {
        let db = test_db().await;
        let repo = db.variations();
        let v = variation(3);
        repo.insert(&v).await.unwrap();

        // Requesting 5 of 3 must fail and report what was available
        let err = repo.reserve(&v.id, 5).await.unwrap_err();
        match err {
            EngineError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let after = repo.get_by_id(&v.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 3);
    }

    #[tokio::test]
    async fn test_reserve_exact_remaining_stock() {
        let db = test_db().await;
        let repo = db.variations();
        let v = variation(5);
        repo.insert(&v).await.unwrap();

        repo.reserve(&v.id, 5).await.unwrap();

        let after = repo.get_by_id(&v.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 0);

        // Drawer is empty now
        assert!(repo.reserve(&v.id, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_release_restores_stock() {
        let db = test_db().await;
        let repo = db.variations();
        let v = variation(10);
        repo.insert(&v).await.unwrap();

        repo.reserve(&v.id, 7).await.unwrap();
        repo.release(&v.id, 7).await.unwrap();

        let after = repo.get_by_id(&v.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 10);
    }

    #[tokio::test]
    async fn test_reserve_unknown_variation() {
        let db = test_db().await;
        let repo = db.variations();

        let err = repo.reserve("missing-id", 1).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::VariationNotFound(_))
        ));
    }
}
