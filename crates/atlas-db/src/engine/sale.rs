//! # Sale Engine
//!
//! Owns the Sale/SaleItem/Payment lifecycle: creation with stock
//! reservation and pricing, incremental payment, cancellation.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │  create_sale ──► PENDING ──── add_payment ────► COMPLETED           │
//! │       │             │     (paid ≥ total; never                     │
//! │       │             │      the reverse)            │                │
//! │       │             │                              │                │
//! │       │             └────────── cancel ────────────┘                │
//! │       │                            │                                │
//! │       └── (initial payments        ▼                                │
//! │            already cover       CANCELLED  (terminal; stock          │
//! │            the total:           restored, payments and posted       │
//! │            born COMPLETED)      movements left intact)              │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation is one transaction: stock reservations, row inserts
//! and bridged ledger movements either all land or none do.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::posting;
use crate::error::EngineResult;
use crate::repository::sale::{
    fetch_items_in, fetch_sale_in, insert_item_in, insert_payment_in, insert_sale_in,
    mark_cancelled_in, set_status_in, total_paid_in, SaleAggregate, SaleRepository,
};
use crate::repository::variation::{fetch_active_in, release_in, reserve_in};
use atlas_core::validation::{
    validate_adjustment_cents, validate_amount_cents, validate_cart_size, validate_quantity,
};
use atlas_core::{
    CoreError, Money, Payment, PaymentMethod, PricedLine, Sale, SaleItem, SaleStatus, SaleTotals,
};

// =============================================================================
// Inputs
// =============================================================================

/// One cart line as submitted by the caller. The unit price is NOT part of
/// the input: it is fetched from the catalog inside the creating
/// transaction, so client-side price tampering has no effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub variation_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub item_discount_cents: i64,
    #[serde(default)]
    pub item_surcharge_cents: i64,
}

impl CartLine {
    /// A line with no per-item adjustments.
    pub fn new(variation_id: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            variation_id: variation_id.into(),
            quantity,
            item_discount_cents: 0,
            item_surcharge_cents: 0,
        }
    }
}

/// A payment to record: an already-settled amount tagged with a method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

/// Everything `create_sale` needs, gathered upfront: the multi-step UI
/// wizard collapses into this one atomic call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSale {
    pub store_id: String,
    /// Cash session to post payments into, if the drawer is involved.
    pub session_id: Option<String>,
    pub seller_id: Option<String>,
    pub customer_id: Option<String>,
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub global_discount_cents: i64,
    #[serde(default)]
    pub global_surcharge_cents: i64,
    #[serde(default)]
    pub initial_payments: Vec<PaymentInput>,
}

// =============================================================================
// Sale Engine
// =============================================================================

/// The sale engine. Holds the pool; each operation opens its own
/// transaction.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    pool: SqlitePool,
}

impl SaleEngine {
    /// Creates a new engine over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        SaleEngine { pool }
    }

    /// Creates a sale from a cart.
    ///
    /// ## What Happens, Atomically
    /// 1. Validate the cart (non-empty, positive quantities, non-negative
    ///    adjustments, positive payment amounts) - before any write
    /// 2. For each line: fetch the variation, freeze its price, reserve
    ///    stock (a failed reservation aborts everything - earlier
    ///    reservations in the same call roll back with the transaction)
    /// 3. Recompute subtotal and total server-side
    /// 4. Insert the sale, its items and the initial payments; the status
    ///    follows the settlement invariant
    /// 5. If a session is given and payments exist, bridge one SALE
    ///    movement per payment; a closed session fails the whole creation
    pub async fn create_sale(&self, input: CreateSale) -> EngineResult<SaleAggregate> {
        validate_cart_size(input.lines.len())?;
        for line in &input.lines {
            validate_quantity(line.quantity)?;
            validate_adjustment_cents("item_discount", line.item_discount_cents)?;
            validate_adjustment_cents("item_surcharge", line.item_surcharge_cents)?;
        }
        validate_adjustment_cents("global_discount", input.global_discount_cents)?;
        validate_adjustment_cents("global_surcharge", input.global_surcharge_cents)?;
        for payment in &input.initial_payments {
            validate_amount_cents("payment amount", payment.amount_cents)?;
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let sale_id = Uuid::new_v4().to_string();

        // Freeze prices and reserve stock, line by line. Any failure here
        // drops the transaction and with it every prior reservation.
        let mut items = Vec::with_capacity(input.lines.len());
        let mut priced = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let variation = fetch_active_in(&mut tx, &line.variation_id).await?;
            reserve_in(&mut tx, &line.variation_id, line.quantity).await?;

            let priced_line = PricedLine {
                quantity: line.quantity,
                unit_price_cents: variation.unit_price_cents,
                item_discount_cents: line.item_discount_cents,
                item_surcharge_cents: line.item_surcharge_cents,
            };
            items.push(SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                variation_id: line.variation_id.clone(),
                quantity: line.quantity,
                unit_price_cents: variation.unit_price_cents,
                item_discount_cents: line.item_discount_cents,
                item_surcharge_cents: line.item_surcharge_cents,
                line_total_cents: priced_line.line_total_cents(),
                created_at: now,
            });
            priced.push(priced_line);
        }

        let totals = SaleTotals::compute(
            &priced,
            input.global_discount_cents,
            input.global_surcharge_cents,
        );
        let paid: i64 = input.initial_payments.iter().map(|p| p.amount_cents).sum();
        let settlement = totals.settlement(paid);

        let sale = Sale {
            id: sale_id.clone(),
            store_id: input.store_id.clone(),
            session_id: input.session_id.clone(),
            seller_id: input.seller_id.clone(),
            customer_id: input.customer_id.clone(),
            global_discount_cents: input.global_discount_cents,
            global_surcharge_cents: input.global_surcharge_cents,
            subtotal_cents: totals.subtotal_cents,
            total_cents: totals.total_cents,
            status: settlement.status,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        };
        insert_sale_in(&mut tx, &sale).await?;
        for item in &items {
            insert_item_in(&mut tx, item).await?;
        }

        let mut payments = Vec::with_capacity(input.initial_payments.len());
        for p in &input.initial_payments {
            let payment = Payment {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                method: p.method,
                amount_cents: p.amount_cents,
                created_at: now,
            };
            insert_payment_in(&mut tx, &payment).await?;

            // The bridge is the only path into the ledger; a session that
            // cannot take the movement fails the whole creation.
            if let Some(ref session_id) = input.session_id {
                posting::post_to_session(
                    &mut tx,
                    session_id,
                    &sale_id,
                    payment.method,
                    payment.amount_cents,
                )
                .await?;
            }

            payments.push(payment);
        }

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            total = %Money::from_cents(totals.total_cents),
            paid = %Money::from_cents(paid),
            status = %settlement.status.as_str(),
            items = items.len(),
            "Sale created"
        );

        Ok(SaleAggregate::assemble(sale, items, payments))
    }

    /// Records a further payment on an existing sale.
    ///
    /// A pending sale flips to completed once paid covers the total; the
    /// transition never runs backwards, and a completed sale keeps
    /// accepting payments (only `change` grows). If `session_id` is given,
    /// one SALE movement equal to this payment's amount (not the sale
    /// total) is bridged into the ledger in the same transaction.
    pub async fn add_payment(
        &self,
        sale_id: &str,
        method: PaymentMethod,
        amount_cents: i64,
        session_id: Option<&str>,
    ) -> EngineResult<SaleAggregate> {
        validate_amount_cents("payment amount", amount_cents)?;

        let mut tx = self.pool.begin().await?;

        let sale = fetch_sale_in(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        if sale.status == SaleStatus::Cancelled {
            return Err(CoreError::InvalidSaleStatus {
                sale_id: sale_id.to_string(),
                current_status: sale.status.as_str().to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.to_string(),
            method,
            amount_cents,
            created_at: now,
        };
        insert_payment_in(&mut tx, &payment).await?;

        let paid = total_paid_in(&mut tx, sale_id).await?;
        if sale.status == SaleStatus::Pending && paid >= sale.total_cents {
            set_status_in(&mut tx, sale_id, SaleStatus::Completed, now).await?;
        }

        if let Some(session_id) = session_id {
            posting::post_to_session(&mut tx, session_id, sale_id, method, amount_cents).await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            amount = %Money::from_cents(amount_cents),
            paid = %Money::from_cents(paid),
            "Payment recorded"
        );

        self.get_sale(sale_id).await
    }

    /// Cancels a sale and restores its reserved stock.
    ///
    /// The status flip is guarded: a concurrent second cancel fails with
    /// `InvalidSaleStatus` instead of restoring the stock twice.
    ///
    /// Prior payments and their posted drawer movements are left intact -
    /// the drawer really did receive the money, and SALE movements are
    /// never deletable. The warning below gives the back office the
    /// numbers to post a manual withdrawal if the cash was handed back.
    pub async fn cancel(&self, sale_id: &str) -> EngineResult<()> {
        let mut tx = self.pool.begin().await?;

        let sale = fetch_sale_in(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        let now = Utc::now();
        if !mark_cancelled_in(&mut tx, sale_id, now).await? {
            return Err(CoreError::InvalidSaleStatus {
                sale_id: sale_id.to_string(),
                current_status: SaleStatus::Cancelled.as_str().to_string(),
            }
            .into());
        }

        let items = fetch_items_in(&mut tx, sale_id).await?;
        for item in &items {
            release_in(&mut tx, &item.variation_id, item.quantity).await?;
        }

        let paid = total_paid_in(&mut tx, sale_id).await?;

        tx.commit().await?;

        if let (Some(session_id), true) = (&sale.session_id, paid > 0) {
            warn!(
                sale_id = %sale_id,
                session_id = %session_id,
                paid = %Money::from_cents(paid),
                "Cancelled sale had session-linked payments; drawer movements were NOT reversed"
            );
        }

        info!(sale_id = %sale_id, items = items.len(), "Sale cancelled, stock restored");

        Ok(())
    }

    /// Hydrates a sale with its items, payments and derived settlement.
    pub async fn get_sale(&self, sale_id: &str) -> EngineResult<SaleAggregate> {
        SaleRepository::new(self.pool.clone())
            .get_aggregate(sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()).into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
