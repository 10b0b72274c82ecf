//! # Engine Module
//!
//! The transactional heart of the crate:
//!
//! - [`sale`] - Sale/SaleItem/Payment lifecycle (create, pay, cancel)
//! - [`session`] - CashSession/Movement lifecycle (open, post, close,
//!   reopen, reconcile)
//! - [`posting`] - the bridge that turns a sale payment into a ledger
//!   movement, the only permitted cross-boundary writer
//!
//! Ownership rules: a Sale is mutated only by the sale engine; a session
//! and its movements only by the ledger. The bridge always writes
//! ledger-side, never back into the sale.

pub mod posting;
pub mod sale;
pub mod session;

pub use sale::{CartLine, CreateSale, PaymentInput, SaleEngine};
pub use session::{CashSessionLedger, ClosedSession, PostedMovement, Reconciliation, SessionView};
