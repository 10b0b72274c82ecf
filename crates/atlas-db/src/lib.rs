//! # atlas-db: Database Layer & Engines for Atlas POS
//!
//! SQLite persistence plus the two transactional engines and the bridge
//! between them.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           atlas-db                                  │
//! │                                                                     │
//! │   ┌───────────────┐        ┌────────────────────┐                   │
//! │   │  SaleEngine   │───────►│   Posting Bridge   │                   │
//! │   │ create / pay  │        │ payment → movement │                   │
//! │   │ cancel        │        └─────────┬──────────┘                   │
//! │   └───────┬───────┘                  │ (only Sale→Ledger path)      │
//! │           │                          ▼                              │
//! │           │              ┌─────────────────────┐                    │
//! │           │              │  CashSessionLedger  │                    │
//! │           │              │ open / post / close │                    │
//! │           │              │ reopen / reconcile  │                    │
//! │           │              └──────────┬──────────┘                    │
//! │           ▼                         ▼                               │
//! │   ┌─────────────────────────────────────────────┐                   │
//! │   │        repositories (rows + derived sums)   │                   │
//! │   │   variations │ sales │ cash_sessions        │                   │
//! │   └──────────────────────┬──────────────────────┘                   │
//! │                          ▼                                          │
//! │            SqlitePool (WAL, FKs, busy timeout)                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating engine operation executes in a single transaction:
//! "read state, validate invariant, write new state" is indivisible, and
//! a downstream failure (short stock, closed session) rolls back every
//! upstream effect of the same call.

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use engine::posting;
pub use engine::{
    CartLine, CashSessionLedger, ClosedSession, CreateSale, PaymentInput, PostedMovement,
    Reconciliation, SaleEngine, SessionView,
};
pub use error::{DbError, DbResult, EngineError, EngineResult};
pub use pool::{Database, DbConfig};
pub use repository::{SaleAggregate, SaleRepository, SessionRepository, VariationRepository};
