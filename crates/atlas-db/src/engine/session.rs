//! # Cash Session Ledger
//!
//! Owns the CashSession/Movement lifecycle: open, post movement, delete
//! movement, close with reconciliation, reopen, reassign responsibility.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │   OpenSession            CloseSession           ReopenSession       │
//! │       │                      │                      │               │
//! │       ▼                      ▼                      ▼               │
//! │    ┌──────┐   close    ┌────────┐   reopen    ┌──────────┐         │
//! │    │ OPEN │ ─────────► │ CLOSED │ ──────────► │ REOPENED │         │
//! │    └──────┘            └────────┘ ◄────────── └──────────┘         │
//! │                                      close                          │
//! │                                                                     │
//! │  OPEN / REOPENED: movements may be posted and (manual kinds)        │
//! │                   deleted                                           │
//! │  CLOSED:          no movement writes, only reopen or read           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Balance recomputation is serialized per session by the write
//! transaction; sessions are independent and parallelize freely.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, EngineResult};
use crate::repository::session::{
    self, delete_movement_in, fetch_movement_in, fetch_session_in, insert_movement_in,
    insert_session_in, movement_sum_in, set_closed_in, set_reopened_in, set_responsible_in,
};
use atlas_core::validation::{
    validate_amount_cents, validate_description, validate_opening_balance_cents,
};
use atlas_core::{
    Actor, CashSession, CoreError, Money, Movement, MovementKind, SessionStatus, ValidationError,
};

// =============================================================================
// Result Types
// =============================================================================

/// A freshly posted movement together with the recomputed balance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedMovement {
    pub movement: Movement,
    pub current_balance_cents: i64,
}

/// The reconciliation delta reported when a session closes.
///
/// Informational, never an error: the drawer is closed with whatever was
/// counted, and the delta tells the back office what to chase.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// opening_balance + Σ movement.signed_amount at close time.
    pub expected_cents: i64,
    /// What the operator physically counted.
    pub counted_cents: i64,
    /// counted − expected: negative is a shortage, positive an overage.
    pub delta_cents: i64,
}

impl Reconciliation {
    /// Missing cash, as a positive number, if any.
    pub fn shortage_cents(&self) -> Option<i64> {
        (self.delta_cents < 0).then(|| -self.delta_cents)
    }

    /// Excess cash, as a positive number, if any.
    pub fn overage_cents(&self) -> Option<i64> {
        (self.delta_cents > 0).then_some(self.delta_cents)
    }
}

/// Close result: the updated session plus its reconciliation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedSession {
    pub session: CashSession,
    pub reconciliation: Reconciliation,
}

/// A fully hydrated session: the row, its movements and the derived
/// balance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session: CashSession,
    pub movements: Vec<Movement>,
    pub current_balance_cents: i64,
}

// =============================================================================
// Cash Session Ledger
// =============================================================================

/// The ledger engine. Every mutating operation runs in one transaction;
/// a downstream failure leaves the session and its movements untouched.
#[derive(Debug, Clone)]
pub struct CashSessionLedger {
    pool: SqlitePool,
}

impl CashSessionLedger {
    /// Creates a new ledger over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        CashSessionLedger { pool }
    }

    /// Opens a new cash session.
    ///
    /// Requires the manage-cash-session capability. Whether a store may
    /// hold two simultaneously open sessions for the same responsible
    /// actor is a collaborator concern; this engine only guards a single
    /// session's own consistency.
    pub async fn open_session(
        &self,
        actor: &Actor,
        store_id: &str,
        responsible_actor_id: &str,
        opening_balance_cents: i64,
    ) -> EngineResult<CashSession> {
        require_manage(actor, "open a cash session")?;
        validate_opening_balance_cents(opening_balance_cents)?;

        let now = Utc::now();
        let session = CashSession {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            responsible_actor_id: responsible_actor_id.to_string(),
            opening_balance_cents,
            closing_balance_cents: None,
            status: SessionStatus::Open,
            opened_at: now,
            closed_at: None,
        };

        let mut tx = self.pool.begin().await?;
        insert_session_in(&mut tx, &session).await?;
        tx.commit().await?;

        info!(
            session_id = %session.id,
            store_id = %store_id,
            opening = %Money::from_cents(opening_balance_cents),
            "Cash session opened"
        );

        Ok(session)
    }

    /// Posts a movement into a session and recomputes the balance.
    ///
    /// Append-only; fails with `SessionClosed` when the session no longer
    /// accepts writes.
    pub async fn post_movement(
        &self,
        session_id: &str,
        kind: MovementKind,
        amount_cents: i64,
        description: Option<String>,
        linked_sale_id: Option<String>,
    ) -> EngineResult<PostedMovement> {
        validate_amount_cents("amount", amount_cents)?;
        if let Some(ref text) = description {
            validate_description(text)?;
        }
        if kind == MovementKind::Sale && linked_sale_id.is_none() {
            return Err(ValidationError::Required {
                field: "linked_sale_id".to_string(),
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let session = fetch_session_in(&mut tx, session_id)
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
            kind,
            amount_cents,
            description,
            linked_sale_id,
            created_at: Utc::now(),
        };
        insert_movement_in(&mut tx, &movement).await?;

        let balance = session.opening_balance_cents + movement_sum_in(&mut tx, session_id).await?;

        tx.commit().await?;

        info!(
            session_id = %session_id,
            kind = %kind.as_str(),
            amount = %Money::from_cents(amount_cents),
            balance = %Money::from_cents(balance),
            "Movement posted"
        );

        Ok(PostedMovement {
            movement,
            current_balance_cents: balance,
        })
    }

    /// Deletes a manually entered movement and recomputes the balance.
    ///
    /// SALE movements are never deletable: they mirror a sale's payment
    /// trail 1:1 and removing one would leave paid money with no ledger
    /// entry.
    pub async fn delete_movement(
        &self,
        session_id: &str,
        movement_id: &str,
    ) -> EngineResult<i64> {
        let mut tx = self.pool.begin().await?;

        let session = fetch_session_in(&mut tx, session_id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        if !session.status.accepts_writes() {
            return Err(CoreError::SessionClosed {
                session_id: session_id.to_string(),
            }
            .into());
        }

        let movement = fetch_movement_in(&mut tx, movement_id)
            .await?
            .filter(|m| m.session_id == session_id)
            .ok_or_else(|| DbError::not_found("Movement", movement_id))?;

        if !movement.kind.is_manual() {
            return Err(CoreError::SaleLinkedMovement {
                movement_id: movement_id.to_string(),
            }
            .into());
        }

        delete_movement_in(&mut tx, session_id, movement_id).await?;
        let balance = session.opening_balance_cents + movement_sum_in(&mut tx, session_id).await?;

        tx.commit().await?;

        info!(
            session_id = %session_id,
            movement_id = %movement_id,
            balance = %Money::from_cents(balance),
            "Movement deleted"
        );

        Ok(balance)
    }

    /// Closes a session against a physically counted balance.
    ///
    /// The reconciliation delta is reported, never enforced: a drawer
    /// that is short still closes, and the delta goes to the back office.
    pub async fn close_session(
        &self,
        actor: &Actor,
        session_id: &str,
        counted_closing_balance_cents: i64,
    ) -> EngineResult<ClosedSession> {
        require_manage(actor, "close a cash session")?;
        if counted_closing_balance_cents < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "counted_closing_balance".to_string(),
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let mut session = fetch_session_in(&mut tx, session_id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        if !session.status.accepts_writes() {
            return Err(CoreError::InvalidSessionStatus {
                session_id: session_id.to_string(),
                current_status: session.status.as_str().to_string(),
            }
            .into());
        }

        let expected =
            session.opening_balance_cents + movement_sum_in(&mut tx, session_id).await?;

        let now = Utc::now();
        set_closed_in(&mut tx, session_id, counted_closing_balance_cents, now).await?;
        tx.commit().await?;

        session.status = SessionStatus::Closed;
        session.closing_balance_cents = Some(counted_closing_balance_cents);
        session.closed_at = Some(now);

        let reconciliation = Reconciliation {
            expected_cents: expected,
            counted_cents: counted_closing_balance_cents,
            delta_cents: counted_closing_balance_cents - expected,
        };

        if reconciliation.delta_cents != 0 {
            warn!(
                session_id = %session_id,
                expected = %Money::from_cents(expected),
                counted = %Money::from_cents(counted_closing_balance_cents),
                delta = %Money::from_cents(reconciliation.delta_cents),
                "Cash session closed with a reconciliation delta"
            );
        } else {
            info!(session_id = %session_id, "Cash session closed, drawer balanced");
        }

        Ok(ClosedSession {
            session,
            reconciliation,
        })
    }

    /// Reopens a closed session.
    ///
    /// Only `Closed` sessions may reopen; calling this on an open or
    /// already-reopened session fails with `InvalidSessionStatus` rather
    /// than silently succeeding. The historical closing balance is kept
    /// until the next close overwrites it.
    pub async fn reopen_session(
        &self,
        actor: &Actor,
        session_id: &str,
    ) -> EngineResult<CashSession> {
        require_manage(actor, "reopen a cash session")?;

        let mut tx = self.pool.begin().await?;

        let mut session = fetch_session_in(&mut tx, session_id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        if session.status != SessionStatus::Closed {
            return Err(CoreError::InvalidSessionStatus {
                session_id: session_id.to_string(),
                current_status: session.status.as_str().to_string(),
            }
            .into());
        }

        set_reopened_in(&mut tx, session_id).await?;
        tx.commit().await?;

        session.status = SessionStatus::Reopened;
        session.closed_at = None;

        info!(session_id = %session_id, "Cash session reopened");

        Ok(session)
    }

    /// Reassigns the responsible actor. Pure metadata; never touches the
    /// balance. Not allowed on a closed session.
    pub async fn change_responsible(
        &self,
        session_id: &str,
        new_actor_id: &str,
    ) -> EngineResult<CashSession> {
        let mut tx = self.pool.begin().await?;

        let mut session = fetch_session_in(&mut tx, session_id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        if !session.status.accepts_writes() {
            return Err(CoreError::InvalidSessionStatus {
                session_id: session_id.to_string(),
                current_status: session.status.as_str().to_string(),
            }
            .into());
        }

        set_responsible_in(&mut tx, session_id, new_actor_id).await?;
        tx.commit().await?;

        session.responsible_actor_id = new_actor_id.to_string();

        info!(session_id = %session_id, new_actor = %new_actor_id, "Responsible actor changed");

        Ok(session)
    }

    /// Hydrates a session with its movements and current balance.
    pub async fn get_session(&self, session_id: &str) -> EngineResult<SessionView> {
        let repo = session::SessionRepository::new(self.pool.clone());

        let session = repo
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;
        let movements = repo.get_movements(session_id).await?;

        let sum: i64 = movements.iter().map(|m| m.signed_amount_cents()).sum();
        let current_balance_cents = session.opening_balance_cents + sum;

        Ok(SessionView {
            session,
            movements,
            current_balance_cents,
        })
    }
}

fn require_manage(actor: &Actor, action: &str) -> EngineResult<()> {
    if !actor.role.can_manage_cash_session() {
        return Err(CoreError::NotPermitted {
            actor_id: actor.id.clone(),
            action: action.to_string(),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::pool::{Database, DbConfig};
    use atlas_core::Role;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn manager() -> Actor {
        Actor::new("mgr-1", Role::Manager)
    }

    fn cashier() -> Actor {
        Actor::new("csh-1", Role::Cashier)
    }

    #[tokio::test]
    async fn test_open_session() {
        let db = test_db().await;
        let ledger = db.cash_ledger();

        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 10_000)
            .await
            .unwrap();

        assert_eq!(session.status, SessionStatus::Open);
        assert_eq!(session.opening_balance_cents, 10_000);
        assert!(session.closing_balance_cents.is_none());
        assert!(session.closed_at.is_none());
    }

    #[tokio::test]
    async fn test_open_session_requires_capability() {
        let db = test_db().await;
        let ledger = db.cash_ledger();

        let err = ledger
            .open_session(&cashier(), "store-1", "csh-1", 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::NotPermitted { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_session_rejects_negative_balance() {
        let db = test_db().await;
        let ledger = db.cash_ledger();

        let err = ledger
            .open_session(&manager(), "store-1", "csh-1", -100)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Validation(
                ValidationError::MustNotBeNegative { .. }
            ))
        ));
    }

    /// Open with 100.00; post SALE 50.00 and WITHDRAWAL 30.00; the drawer
    /// holds 120.00.
    #[tokio::test]
    async fn test_balance_mixes_inflow_and_outflow() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 10_000)
            .await
            .unwrap();

        let posted = ledger
            .post_movement(
                &session.id,
                MovementKind::Sale,
                5_000,
                None,
                Some("sale-1".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(posted.current_balance_cents, 15_000);

        let posted = ledger
            .post_movement(
                &session.id,
                MovementKind::Withdrawal,
                3_000,
                Some("bank deposit".to_string()),
                None,
            )
            .await
            .unwrap();
        assert_eq!(posted.current_balance_cents, 12_000);

        let view = ledger.get_session(&session.id).await.unwrap();
        assert_eq!(view.current_balance_cents, 12_000);
        assert_eq!(view.movements.len(), 2);
    }

    /// The balance is a commutative sum: posting the same movements in a
    /// different order gives the same result.
    #[tokio::test]
    async fn test_balance_is_order_independent() {
        let db = test_db().await;
        let ledger = db.cash_ledger();

        let a = ledger
            .open_session(&manager(), "store-1", "csh-1", 2_000)
            .await
            .unwrap();
        let b = ledger
            .open_session(&manager(), "store-1", "csh-2", 2_000)
            .await
            .unwrap();

        for (kind, amount) in [
            (MovementKind::ManualIn, 500),
            (MovementKind::Expense, 300),
            (MovementKind::ManualIn, 700),
        ] {
            ledger
                .post_movement(&a.id, kind, amount, None, None)
                .await
                .unwrap();
        }
        for (kind, amount) in [
            (MovementKind::ManualIn, 700),
            (MovementKind::ManualIn, 500),
            (MovementKind::Expense, 300),
        ] {
            ledger
                .post_movement(&b.id, kind, amount, None, None)
                .await
                .unwrap();
        }

        let balance_a = ledger.get_session(&a.id).await.unwrap().current_balance_cents;
        let balance_b = ledger.get_session(&b.id).await.unwrap().current_balance_cents;
        assert_eq!(balance_a, 2_900);
        assert_eq!(balance_a, balance_b);
    }

    #[tokio::test]
    async fn test_post_rejects_non_positive_amount() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 0)
            .await
            .unwrap();

        assert!(ledger
            .post_movement(&session.id, MovementKind::ManualIn, 0, None, None)
            .await
            .is_err());
        assert!(ledger
            .post_movement(&session.id, MovementKind::ManualIn, -500, None, None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_post_sale_kind_requires_linked_sale() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 0)
            .await
            .unwrap();

        let err = ledger
            .post_movement(&session.id, MovementKind::Sale, 1_000, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[tokio::test]
    async fn test_post_to_closed_session_fails() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 1_000)
            .await
            .unwrap();
        ledger
            .close_session(&manager(), &session.id, 1_000)
            .await
            .unwrap();

        let err = ledger
            .post_movement(&session.id, MovementKind::ManualIn, 500, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::SessionClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_manual_movement_recomputes_balance() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 1_000)
            .await
            .unwrap();

        let posted = ledger
            .post_movement(
                &session.id,
                MovementKind::Expense,
                400,
                Some("window cleaner".to_string()),
                None,
            )
            .await
            .unwrap();
        assert_eq!(posted.current_balance_cents, 600);

        let balance = ledger
            .delete_movement(&session.id, &posted.movement.id)
            .await
            .unwrap();
        assert_eq!(balance, 1_000);

        let view = ledger.get_session(&session.id).await.unwrap();
        assert!(view.movements.is_empty());
    }

    #[tokio::test]
    async fn test_delete_sale_movement_is_refused() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 0)
            .await
            .unwrap();

        let posted = ledger
            .post_movement(
                &session.id,
                MovementKind::Sale,
                2_500,
                None,
                Some("sale-1".to_string()),
            )
            .await
            .unwrap();

        let err = ledger
            .delete_movement(&session.id, &posted.movement.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::SaleLinkedMovement { .. })
        ));

        // The movement survives
        let view = ledger.get_session(&session.id).await.unwrap();
        assert_eq!(view.movements.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_after_close_is_refused() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 1_000)
            .await
            .unwrap();
        let posted = ledger
            .post_movement(&session.id, MovementKind::Expense, 100, None, None)
            .await
            .unwrap();
        ledger
            .close_session(&manager(), &session.id, 900)
            .await
            .unwrap();

        let err = ledger
            .delete_movement(&session.id, &posted.movement.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::SessionClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_close_balanced_drawer() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 10_000)
            .await
            .unwrap();
        ledger
            .post_movement(
                &session.id,
                MovementKind::Sale,
                5_000,
                None,
                Some("sale-1".to_string()),
            )
            .await
            .unwrap();

        let closed = ledger
            .close_session(&manager(), &session.id, 15_000)
            .await
            .unwrap();

        assert_eq!(closed.session.status, SessionStatus::Closed);
        assert_eq!(closed.session.closing_balance_cents, Some(15_000));
        assert!(closed.session.closed_at.is_some());
        assert_eq!(closed.reconciliation.expected_cents, 15_000);
        assert_eq!(closed.reconciliation.delta_cents, 0);
        assert!(closed.reconciliation.shortage_cents().is_none());
        assert!(closed.reconciliation.overage_cents().is_none());
    }

    #[tokio::test]
    async fn test_close_reports_shortage_and_overage() {
        let db = test_db().await;
        let ledger = db.cash_ledger();

        let short = ledger
            .open_session(&manager(), "store-1", "csh-1", 10_000)
            .await
            .unwrap();
        let closed = ledger
            .close_session(&manager(), &short.id, 9_200)
            .await
            .unwrap();
        assert_eq!(closed.reconciliation.delta_cents, -800);
        assert_eq!(closed.reconciliation.shortage_cents(), Some(800));

        let over = ledger
            .open_session(&manager(), "store-1", "csh-2", 10_000)
            .await
            .unwrap();
        let closed = ledger
            .close_session(&manager(), &over.id, 10_350)
            .await
            .unwrap();
        assert_eq!(closed.reconciliation.delta_cents, 350);
        assert_eq!(closed.reconciliation.overage_cents(), Some(350));
    }

    #[tokio::test]
    async fn test_close_twice_fails() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 0)
            .await
            .unwrap();
        ledger
            .close_session(&manager(), &session.id, 0)
            .await
            .unwrap();

        let err = ledger
            .close_session(&manager(), &session.id, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidSessionStatus { .. })
        ));
    }

    #[tokio::test]
    async fn test_close_requires_capability() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 0)
            .await
            .unwrap();

        let err = ledger
            .close_session(&cashier(), &session.id, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::NotPermitted { .. })
        ));
    }

    #[tokio::test]
    async fn test_reopen_lifecycle() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 5_000)
            .await
            .unwrap();
        ledger
            .close_session(&manager(), &session.id, 5_000)
            .await
            .unwrap();

        let reopened = ledger
            .reopen_session(&manager(), &session.id)
            .await
            .unwrap();
        assert_eq!(reopened.status, SessionStatus::Reopened);
        assert!(reopened.closed_at.is_none());
        // Historical closing balance survives the reopen
        assert_eq!(reopened.closing_balance_cents, Some(5_000));

        // A reopened session accepts writes again
        ledger
            .post_movement(&session.id, MovementKind::ManualIn, 1_000, None, None)
            .await
            .unwrap();

        // And closes again, overwriting the historical balance
        let closed = ledger
            .close_session(&manager(), &session.id, 6_000)
            .await
            .unwrap();
        assert_eq!(closed.session.closing_balance_cents, Some(6_000));
        assert_eq!(closed.reconciliation.delta_cents, 0);
    }

    #[tokio::test]
    async fn test_reopen_requires_closed_status() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 0)
            .await
            .unwrap();

        // Open session: reopen is invalid
        let err = ledger
            .reopen_session(&manager(), &session.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidSessionStatus { .. })
        ));

        // Reopened session: a second reopen must fail, not silently succeed
        ledger
            .close_session(&manager(), &session.id, 0)
            .await
            .unwrap();
        ledger
            .reopen_session(&manager(), &session.id)
            .await
            .unwrap();
        let err = ledger
            .reopen_session(&manager(), &session.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidSessionStatus { .. })
        ));
    }

    #[tokio::test]
    async fn test_change_responsible() {
        let db = test_db().await;
        let ledger = db.cash_ledger();
        let session = ledger
            .open_session(&manager(), "store-1", "csh-1", 1_000)
            .await
            .unwrap();

        let updated = ledger
            .change_responsible(&session.id, "csh-2")
            .await
            .unwrap();
        assert_eq!(updated.responsible_actor_id, "csh-2");

        // Balance untouched
        let view = ledger.get_session(&session.id).await.unwrap();
        assert_eq!(view.current_balance_cents, 1_000);

        // Not allowed once closed
        ledger
            .close_session(&manager(), &session.id, 1_000)
            .await
            .unwrap();
        assert!(ledger.change_responsible(&session.id, "csh-3").await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_session_is_reported() {
        let db = test_db().await;
        let ledger = db.cash_ledger();

        let err = ledger.get_session("missing").await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::SessionNotFound(_))
        ));
    }
}
