//! # Posting Bridge
//!
//! The single path by which Sale-side events cross into the cash ledger:
//! recording a payment against an active session posts one SALE-kind
//! movement mirroring that payment.
//!
//! The bridge performs no business decision beyond the mapping
//! `payment → movement { kind: Sale, amount: payment.amount,
//! linked_sale_id: sale.id, description: payment.method label }`.
//! It runs inside the caller's transaction: if the session is not
//! postable, the error aborts the whole enclosing payment operation -
//! a sale must never show paid money with no corresponding ledger entry.
//! The bridge writes only ledger-side, never back into the sale.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::repository::session;
use atlas_core::{CoreError, Movement, MovementKind, PaymentMethod};

/// Posts one SALE movement mirroring a payment, inside the caller's
/// open transaction.
///
/// ## Errors
/// - `SessionNotFound` when the target session does not exist
/// - `SessionClosed` when the session no longer accepts writes
pub async fn post_to_session(
    conn: &mut SqliteConnection,
    session_id: &str,
    sale_id: &str,
    method: PaymentMethod,
    amount_cents: i64,
) -> EngineResult<Movement> {
    let session = session::fetch_session_in(conn, session_id)
        .await?
        .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

    if !session.status.accepts_writes() {
        return Err(CoreError::SessionClosed {
            session_id: session_id.to_string(),
        }
        .into());
    }

    let movement = Movement {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        kind: MovementKind::Sale,
        amount_cents,
        description: Some(method.label().to_string()),
        linked_sale_id: Some(sale_id.to_string()),
        created_at: Utc::now(),
    };

    session::insert_movement_in(conn, &movement).await?;

    debug!(
        session_id = %session_id,
        sale_id = %sale_id,
        amount = %amount_cents,
        "Bridged payment into ledger"
    );

    Ok(movement)
}
