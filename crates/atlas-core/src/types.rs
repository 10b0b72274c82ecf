//! # Domain Types
//!
//! Core domain types for the sale transaction and cash-drawer ledger engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐          │
//! │  │     Sale      │   │   SaleItem    │   │    Payment    │          │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────  │          │
//! │  │  id (UUID)    │   │  sale_id (FK) │   │  sale_id (FK) │          │
//! │  │  status       │   │  variation_id │   │  method       │          │
//! │  │  total_cents  │   │  unit_price   │   │  amount_cents │          │
//! │  └───────────────┘   └───────────────┘   └───────────────┘          │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐          │
//! │  │  CashSession  │   │   Movement    │   │   Variation   │          │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────  │          │
//! │  │  opening_bal  │   │  kind (sign)  │   │  unit_price   │          │
//! │  │  status       │   │  amount > 0   │   │  stock_qty    │          │
//! │  └───────────────┘   └───────────────┘   └───────────────┘          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has an `id`: UUID v4, immutable, used for database
//! relations. Monetary fields are stored as `*_cents` (i64) and exposed as
//! [`Money`] through accessor methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// Lifecycle: created `Pending` or `Completed` (when initial payments
/// already cover the total) → payments may flip `Pending` to `Completed`
/// (never the reverse) → `Cancelled` from either, terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Payments received so far do not cover the total.
    Pending,
    /// Paid in full (paid ≥ total).
    Completed,
    /// Cancelled; stock restored. Terminal.
    Cancelled,
}

impl SaleStatus {
    /// String form as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a payment was settled.
///
/// Payments are recorded as already-settled amounts tagged with a method
/// label; there is no gateway integration behind these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Pix,
    Credit,
    Debit,
    OnAccount,
}

impl PaymentMethod {
    /// Uppercase label used as the description of bridged SALE movements.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Credit => "CREDIT",
            PaymentMethod::Debit => "DEBIT",
            PaymentMethod::OnAccount => "ON_ACCOUNT",
        }
    }
}

// =============================================================================
// Session Status
// =============================================================================

/// The status of a cash-drawer session.
///
/// State machine: `Open → Closed → Reopened → Closed → …`. `Reopened`
/// behaves as `Open` for all write purposes but preserves that the session
/// was once closed; `Closed` permits only reopen or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Closed,
    Reopened,
}

impl SessionStatus {
    /// Whether movements may be posted or deleted in this status.
    pub fn accepts_writes(&self) -> bool {
        matches!(self, SessionStatus::Open | SessionStatus::Reopened)
    }

    /// String form as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::Closed => "closed",
            SessionStatus::Reopened => "reopened",
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Open
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// The kind of a cash movement; the sign of its balance effect derives
/// from the kind, the stored amount is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Sale proceeds, posted through the bridge. Inflow.
    Sale,
    /// Manual cash taken out of the drawer. Outflow.
    Withdrawal,
    /// Manual cash put into the drawer. Inflow.
    ManualIn,
    /// Drawer cash spent on an expense. Outflow.
    Expense,
}

impl MovementKind {
    /// Inflow kinds add to the balance, outflow kinds subtract.
    pub fn is_inflow(&self) -> bool {
        matches!(self, MovementKind::Sale | MovementKind::ManualIn)
    }

    /// Manually entered kinds may be deleted while the session is open;
    /// SALE movements never (they mirror a sale's payment trail).
    pub fn is_manual(&self) -> bool {
        !matches!(self, MovementKind::Sale)
    }

    /// +1 for inflow, -1 for outflow.
    pub fn sign(&self) -> i64 {
        if self.is_inflow() {
            1
        } else {
            -1
        }
    }

    /// String form as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Sale => "sale",
            MovementKind::Withdrawal => "withdrawal",
            MovementKind::ManualIn => "manual_in",
            MovementKind::Expense => "expense",
        }
    }
}

// =============================================================================
// Actor & Role
// =============================================================================

/// The capability surface the engines need from the identity collaborator.
///
/// Who the actor actually is, how they logged in and how roles are assigned
/// is out of scope; the engines only thread an explicit `Actor` through
/// each call (no ambient "current user" state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
}

impl Role {
    /// Whether this role may open, close and reopen cash sessions.
    pub fn can_manage_cash_session(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

/// The acting user, as seen by the engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Actor { id: id.into(), role }
    }
}

// =============================================================================
// Variation
// =============================================================================

/// A purchasable product variation - the minimal catalog surface the
/// engines consume (price lookup and atomic stock adjustment). Full
/// catalog CRUD lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Variation {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub unit_price_cents: i64,

    /// Current stock level.
    pub stock_qty: i64,

    /// Whether the variation is sellable (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variation {
    /// Returns the price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale transaction.
///
/// `subtotal_cents`/`total_cents` are stored for cheap reads but the engine
/// recomputes them from catalog prices on every write; client-submitted
/// totals are hints only. `paid` and `change` are never stored - they are
/// derived by summing payments at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub store_id: String,
    /// Cash session used for this sale's payments, if any.
    pub session_id: Option<String>,
    pub seller_id: Option<String>,
    pub customer_id: Option<String>,
    /// Sale-level discount in cents, clamped so the total never goes negative.
    pub global_discount_cents: i64,
    /// Sale-level surcharge in cents.
    pub global_surcharge_cents: i64,
    pub subtotal_cents: i64,
    pub total_cents: i64,
    pub status: SaleStatus,
    /// Immutable once set.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// Uses the snapshot pattern: `unit_price_cents` is frozen at creation
/// time, so later catalog price changes never alter historical sales.
/// Items are created with the sale and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub variation_id: String,
    /// Quantity sold (> 0).
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Per-line discount in cents (≥ 0).
    pub item_discount_cents: i64,
    /// Per-line surcharge in cents (≥ 0).
    pub item_surcharge_cents: i64,
    /// quantity × max(0, unit_price − item_discount + item_surcharge).
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment towards a sale.
///
/// Append-only: payments are never deleted or edited (financial audit
/// requirement). A sale can carry multiple payments for split tender and
/// incremental settlement of pending sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    pub method: PaymentMethod,
    /// Amount paid in cents (> 0).
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Cash Session
// =============================================================================

/// A bounded period during which a physical cash drawer is open and
/// attributable to one responsible actor (the "caixa").
///
/// `current_balance` is never stored: it is always
/// `opening_balance + Σ movement.signed_amount`, recomputed from the
/// movements. The closing balance is what the operator counted, retained
/// as history across a reopen until the next close overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashSession {
    pub id: String,
    pub store_id: String,
    pub responsible_actor_id: String,
    /// Cash in the drawer when the session opened (≥ 0).
    pub opening_balance_cents: i64,
    /// Counted cash at close time; None while never closed.
    pub closing_balance_cents: Option<i64>,
    pub status: SessionStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl CashSession {
    #[inline]
    pub fn opening_balance(&self) -> Money {
        Money::from_cents(self.opening_balance_cents)
    }
}

// =============================================================================
// Movement
// =============================================================================

/// A single posted change (in or out) to a cash session's balance.
///
/// Immutable once created except for deletion of manual kinds while the
/// session is not closed. Owned exclusively by its session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: String,
    pub session_id: String,
    pub kind: MovementKind,
    /// Always stored positive; the sign is derived from `kind`.
    pub amount_cents: i64,
    pub description: Option<String>,
    /// Set when `kind = Sale`: the sale whose payment this mirrors.
    pub linked_sale_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// The movement's contribution to the session balance.
    #[inline]
    pub fn signed_amount_cents(&self) -> i64 {
        self.kind.sign() * self.amount_cents
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
