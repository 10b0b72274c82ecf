//! # Cash Session Repository
//!
//! Read-side access to cash sessions and their movements, plus the
//! transaction-scoped writes the ledger engine composes.
//!
//! ## The Balance Is Always Derived
//! ```text
//! current_balance = opening_balance + Σ movement.signed_amount
//! ```
//! The signed sum is computed in SQL (inflow kinds positive, outflow kinds
//! negative) and is commutative: insertion order never changes the result.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use atlas_core::{CashSession, Movement};

/// Repository for cash session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(
            r#"
            SELECT
                id, store_id, responsible_actor_id,
                opening_balance_cents, closing_balance_cents,
                status, opened_at, closed_at
            FROM cash_sessions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Gets all movements of a session, ordered by creation time.
    pub async fn get_movements(&self, session_id: &str) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT
                id, session_id, kind, amount_cents, description,
                linked_sale_id, created_at
            FROM cash_movements
            WHERE session_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Recomputes the session's current balance from its movements.
    pub async fn current_balance(&self, session_id: &str) -> DbResult<i64> {
        let session = self
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| DbError::not_found("CashSession", session_id))?;

        let mut conn = self.pool.acquire().await?;
        let sum = movement_sum_in(&mut conn, session_id).await?;
        Ok(session.opening_balance_cents + sum)
    }
}

// =============================================================================
// Transaction-Scoped Operations
// =============================================================================

/// Fetches a session row inside an open transaction.
pub(crate) async fn fetch_session_in(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> DbResult<Option<CashSession>> {
    let session = sqlx::query_as::<_, CashSession>(
        r#"
        SELECT
            id, store_id, responsible_actor_id,
            opening_balance_cents, closing_balance_cents,
            status, opened_at, closed_at
        FROM cash_sessions
        WHERE id = ?1
        "#,
    )
    .bind(session_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(session)
}

/// Fetches a single movement inside an open transaction.
pub(crate) async fn fetch_movement_in(
    conn: &mut SqliteConnection,
    movement_id: &str,
) -> DbResult<Option<Movement>> {
    let movement = sqlx::query_as::<_, Movement>(
        r#"
        SELECT
            id, session_id, kind, amount_cents, description,
            linked_sale_id, created_at
        FROM cash_movements
        WHERE id = ?1
        "#,
    )
    .bind(movement_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(movement)
}

/// Inserts a session row.
pub(crate) async fn insert_session_in(
    conn: &mut SqliteConnection,
    session: &CashSession,
) -> DbResult<()> {
    debug!(id = %session.id, store_id = %session.store_id, "Opening cash session");

    sqlx::query(
        r#"
        INSERT INTO cash_sessions (
            id, store_id, responsible_actor_id,
            opening_balance_cents, closing_balance_cents,
            status, opened_at, closed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&session.id)
    .bind(&session.store_id)
    .bind(&session.responsible_actor_id)
    .bind(session.opening_balance_cents)
    .bind(session.closing_balance_cents)
    .bind(session.status)
    .bind(session.opened_at)
    .bind(session.closed_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Appends a movement row.
pub(crate) async fn insert_movement_in(
    conn: &mut SqliteConnection,
    movement: &Movement,
) -> DbResult<()> {
    debug!(
        session_id = %movement.session_id,
        kind = %movement.kind.as_str(),
        amount = %movement.amount_cents,
        "Posting movement"
    );

    sqlx::query(
        r#"
        INSERT INTO cash_movements (
            id, session_id, kind, amount_cents, description,
            linked_sale_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.session_id)
    .bind(movement.kind)
    .bind(movement.amount_cents)
    .bind(&movement.description)
    .bind(&movement.linked_sale_id)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Deletes a movement row. Returns false when no row matched.
pub(crate) async fn delete_movement_in(
    conn: &mut SqliteConnection,
    session_id: &str,
    movement_id: &str,
) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM cash_movements WHERE id = ?1 AND session_id = ?2")
        .bind(movement_id)
        .bind(session_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Signed movement sum for a session: inflows positive, outflows negative.
pub(crate) async fn movement_sum_in(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> DbResult<i64> {
    let sum: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(
            CASE WHEN kind IN ('sale', 'manual_in')
                 THEN amount_cents
                 ELSE -amount_cents
            END
        ), 0)
        FROM cash_movements
        WHERE session_id = ?1
        "#,
    )
    .bind(session_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(sum)
}

/// Marks a session closed with the counted balance.
pub(crate) async fn set_closed_in(
    conn: &mut SqliteConnection,
    session_id: &str,
    counted_closing_balance_cents: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE cash_sessions
        SET status = 'closed', closing_balance_cents = ?2, closed_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(session_id)
    .bind(counted_closing_balance_cents)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Marks a session reopened. The historical closing balance is retained
/// until the next close overwrites it.
pub(crate) async fn set_reopened_in(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE cash_sessions
        SET status = 'reopened', closed_at = NULL
        WHERE id = ?1
        "#,
    )
    .bind(session_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Reassigns the responsible actor (metadata only, no balance effect).
pub(crate) async fn set_responsible_in(
    conn: &mut SqliteConnection,
    session_id: &str,
    new_actor_id: &str,
) -> DbResult<()> {
    sqlx::query("UPDATE cash_sessions SET responsible_actor_id = ?2 WHERE id = ?1")
        .bind(session_id)
        .bind(new_actor_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
