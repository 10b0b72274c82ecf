//! # Sale Totals & Settlement Math
//!
//! Pure pricing arithmetic shared by the Sale Engine and anything that
//! wants to preview a cart. The engine is authoritative: whatever a client
//! computed for display, these functions are re-run server-side on the
//! prices fetched from the catalog before anything is written.
//!
//! ## Clamping policy
//! Discounts and surcharges never push a line or a sale total below zero.
//! They adjust the line subtotal, not the unit price:
//!
//! ```text
//! line_total = quantity × max(0, unit_price − item_discount + item_surcharge)
//! subtotal   = Σ line_total
//! total      = max(0, subtotal − global_discount + global_surcharge)
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::SaleStatus;

// =============================================================================
// Priced Line
// =============================================================================

/// One sale line with its frozen unit price, ready for totalling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub item_discount_cents: i64,
    pub item_surcharge_cents: i64,
}

impl PricedLine {
    /// A line with no per-item adjustments.
    pub fn new(quantity: i64, unit_price_cents: i64) -> Self {
        PricedLine {
            quantity,
            unit_price_cents,
            item_discount_cents: 0,
            item_surcharge_cents: 0,
        }
    }

    /// Line total with the clamping policy applied.
    pub fn line_total(&self) -> Money {
        let effective = Money::from_cents(self.unit_price_cents + self.item_surcharge_cents)
            .sub_clamped(Money::from_cents(self.item_discount_cents));
        effective.multiply_quantity(self.quantity)
    }

    pub fn line_total_cents(&self) -> i64 {
        self.line_total().cents()
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Subtotal and total of a sale, derived from its lines and the
/// sale-level adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal_cents: i64,
    pub total_cents: i64,
}

impl SaleTotals {
    /// Computes subtotal and total for a set of priced lines.
    pub fn compute(
        lines: &[PricedLine],
        global_discount_cents: i64,
        global_surcharge_cents: i64,
    ) -> Self {
        let subtotal = lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total());

        let total = (subtotal + Money::from_cents(global_surcharge_cents))
            .sub_clamped(Money::from_cents(global_discount_cents));

        SaleTotals {
            subtotal_cents: subtotal.cents(),
            total_cents: total.cents(),
        }
    }

    /// Derives the settlement state for a given amount paid.
    pub fn settlement(&self, paid_cents: i64) -> Settlement {
        Settlement::of(self.total_cents, paid_cents)
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// The paid/change/status triple implied by the settlement invariant:
/// `Completed ⇔ paid ≥ total`, `Pending ⇔ paid < total`.
///
/// Cancellation is a lifecycle decision, not a settlement state; this type
/// never produces `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub paid_cents: i64,
    pub change_cents: i64,
    pub status: SaleStatus,
}

impl Settlement {
    pub fn of(total_cents: i64, paid_cents: i64) -> Self {
        let change = Money::from_cents(paid_cents).sub_clamped(Money::from_cents(total_cents));
        let status = if paid_cents >= total_cents {
            SaleStatus::Completed
        } else {
            SaleStatus::Pending
        };
        Settlement {
            paid_cents,
            change_cents: change.cents(),
            status,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_plain() {
        // 2 × 10.00
        let line = PricedLine::new(2, 1000);
        assert_eq!(line.line_total_cents(), 2000);
    }

    #[test]
    fn test_line_total_with_adjustments() {
        // 3 × (5.00 − 1.00 + 0.50) = 13.50
        let line = PricedLine {
            quantity: 3,
            unit_price_cents: 500,
            item_discount_cents: 100,
            item_surcharge_cents: 50,
        };
        assert_eq!(line.line_total_cents(), 1350);
    }

    #[test]
    fn test_line_discount_clamps_at_zero() {
        // Discount exceeds price + surcharge: line clamps to zero,
        // it never goes negative
        let line = PricedLine {
            quantity: 4,
            unit_price_cents: 300,
            item_discount_cents: 900,
            item_surcharge_cents: 100,
        };
        assert_eq!(line.line_total_cents(), 0);
    }

    #[test]
    fn test_sale_totals() {
        let lines = [PricedLine::new(2, 1000), PricedLine::new(1, 550)];
        let totals = SaleTotals::compute(&lines, 0, 0);
        assert_eq!(totals.subtotal_cents, 2550);
        assert_eq!(totals.total_cents, 2550);
    }

    #[test]
    fn test_sale_totals_with_global_adjustments() {
        let lines = [PricedLine::new(2, 1000)];
        let totals = SaleTotals::compute(&lines, 300, 100);
        assert_eq!(totals.subtotal_cents, 2000);
        // 2000 − 300 + 100
        assert_eq!(totals.total_cents, 1800);
    }

    #[test]
    fn test_global_discount_clamps_at_zero() {
        let lines = [PricedLine::new(1, 500)];
        let totals = SaleTotals::compute(&lines, 10_000, 0);
        assert_eq!(totals.subtotal_cents, 500);
        assert_eq!(totals.total_cents, 0);
    }

    #[test]
    fn test_settlement_invariant() {
        // paid < total → Pending, no change
        let s = Settlement::of(2000, 1200);
        assert_eq!(s.status, SaleStatus::Pending);
        assert_eq!(s.change_cents, 0);

        // paid == total → Completed, no change
        let s = Settlement::of(2000, 2000);
        assert_eq!(s.status, SaleStatus::Completed);
        assert_eq!(s.change_cents, 0);

        // paid > total → Completed with change
        let s = Settlement::of(2000, 2500);
        assert_eq!(s.status, SaleStatus::Completed);
        assert_eq!(s.change_cents, 500);
    }

    #[test]
    fn test_zero_total_is_immediately_completed() {
        // A fully discounted sale needs no payment to complete
        let s = Settlement::of(0, 0);
        assert_eq!(s.status, SaleStatus::Completed);
        assert_eq!(s.change_cents, 0);
    }
}
