//! # Repository Module
//!
//! Row-level database access, one repository per aggregate:
//!
//! - [`variation`] - catalog surface + atomic stock ledger adapter
//! - [`sale`] - sales, items, payments, derived paid sum
//! - [`session`] - cash sessions, movements, derived balance
//!
//! Repositories do plain reads and writes; the multi-step transactional
//! flows live in [`crate::engine`].

pub mod sale;
pub mod session;
pub mod variation;

pub use sale::{SaleAggregate, SaleRepository};
pub use session::SessionRepository;
pub use variation::VariationRepository;
