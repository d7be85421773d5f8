//! Assembled orders, their pricing breakdowns, and submission outcomes.

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartLineItem;
use super::fulfillment::FulfillmentSelection;
use super::id::{CardId, OrderRef, RestaurantId};
use super::money::Money;

// ============================================================================
// Tip
// ============================================================================

/// Customer tip, either relative to the subtotal or a flat amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Tip {
    /// No tip.
    #[default]
    None,
    /// Percentage of the subtotal, e.g. `15` for 15%.
    Percentage(Decimal),
    /// Flat amount, independent of the subtotal.
    Fixed(Money),
}

// ============================================================================
// Pricing
// ============================================================================

/// Every component of an order's price, each independently displayable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    /// Sum of all line totals.
    pub subtotal: Money,
    /// Flat delivery fee; zero for pickup.
    pub delivery_fee: Money,
    /// Taxes on the subtotal.
    pub taxes: Money,
    /// Resolved tip amount.
    pub tip: Money,
    /// `subtotal + delivery_fee + taxes + tip`.
    pub total: Money,
}

impl PricingBreakdown {
    /// All components zero, the breakdown of an empty cart.
    pub const ZERO: Self = Self {
        subtotal: Money::ZERO,
        delivery_fee: Money::ZERO,
        taxes: Money::ZERO,
        tip: Money::ZERO,
        total: Money::ZERO,
    };
}

// ============================================================================
// Order
// ============================================================================

/// A fully assembled order, ready for submission.
///
/// Equality compares every component, which lets callers detect that two
/// submissions would carry identical payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Restaurant the order is placed against.
    pub restaurant_id: RestaurantId,
    /// Cart contents at assembly time.
    pub line_items: Vec<CartLineItem>,
    /// Method, mode and (for scheduled orders) the confirmed time.
    pub fulfillment: FulfillmentSelection,
    /// Complete price breakdown.
    pub pricing: PricingBreakdown,
    /// Saved card paying for the order.
    pub payment_method_ref: CardId,
    /// Local time the order was assembled.
    pub created_at: DateTime<Local>,
}

/// What the ordering service reported back for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// Reference the service assigned to the order.
    pub order_id: OrderRef,
    /// Service-side status, e.g. `received`.
    pub status: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tip_default_is_none() {
        assert_eq!(Tip::default(), Tip::None);
    }

    #[test]
    fn test_tip_serde_shapes() {
        let pct = serde_json::to_value(Tip::Percentage(Decimal::new(15, 0))).unwrap();
        assert_eq!(pct.get("kind"), Some(&serde_json::json!("percentage")));
        assert_eq!(pct.get("amount"), Some(&serde_json::json!("15")));

        let fixed = serde_json::to_value(Tip::Fixed(Money::from_minor(500))).unwrap();
        assert_eq!(fixed.get("kind"), Some(&serde_json::json!("fixed")));
        assert_eq!(fixed.get("amount"), Some(&serde_json::json!(500)));

        let none: Tip = serde_json::from_value(serde_json::json!({ "kind": "none" })).unwrap();
        assert_eq!(none, Tip::None);
    }

    #[test]
    fn test_zero_breakdown_totals_zero() {
        assert_eq!(PricingBreakdown::ZERO.total, Money::ZERO);
        assert_eq!(PricingBreakdown::ZERO.subtotal, Money::ZERO);
    }
}
