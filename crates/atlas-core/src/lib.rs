//! # atlas-core: Pure Business Logic for Atlas POS
//!
//! This crate is the **heart** of the Atlas POS sale and cash-drawer
//! engine. It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Atlas POS Architecture                         │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │            Transport layer (desktop / HTTP / CLI)           │   │
//! │  │        create_sale, add_payment, open_session, ...          │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │              ★ atlas-core (THIS CRATE) ★                    │   │
//! │  │                                                             │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────┐   │   │
//! │  │  │  types   │ │  money   │ │  totals  │ │  validation  │   │   │
//! │  │  │ Sale     │ │  Money   │ │ SaleTotals│ │   rules      │   │   │
//! │  │  │ Session  │ │ parsing  │ │ Settlement│ │   checks     │   │   │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └──────────────┘   │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                  atlas-db (Database Layer)                  │   │
//! │  │      SQLite queries, migrations, repositories, engines      │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sale, Payment, CashSession, Movement, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`totals`] - Sale pricing and settlement math
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use atlas_core::money::Money;
//! use atlas_core::totals::{PricedLine, SaleTotals};
//!
//! // Create money from cents (never from floats!)
//! let unit_price = Money::from_cents(1000); // 10.00
//!
//! // Two units, no adjustments
//! let line = PricedLine::new(2, unit_price.cents());
//! let totals = SaleTotals::compute(&[line], 0, 0);
//!
//! assert_eq!(totals.total_cents, 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use atlas_core::Money` instead of
// `use atlas_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use totals::{PricedLine, SaleTotals, Settlement};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single sale
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single variation per line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum length of a free-text movement description
pub const MAX_DESCRIPTION_LEN: usize = 500;
