//! Subtotal, fees, taxes, tip and total.
//!
//! Pure functions over cart snapshots. Every rounding decision in the
//! workspace funnels through [`Money`](plateful_core::Money)'s half-up
//! conversion here so the same rule applies wherever a figure is computed,
//! not just where it is displayed.

use plateful_core::{CartLineItem, FulfillmentMethod, Money, PricingBreakdown, Tip};
use rust_decimal::Decimal;

// ============================================================================
// PricingConfig
// ============================================================================

/// Deployment-level pricing constants.
///
/// The delivery fee is a flat amount, not distance-derived; the backend owns
/// any future per-restaurant pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    /// Flat fee applied to delivery orders.
    pub delivery_fee: Money,
    /// Tax rate as a fraction, e.g. `0.05` for 5%.
    pub tax_rate: Decimal,
}

impl PricingConfig {
    /// Bundle a fee and tax rate.
    #[must_use]
    pub const fn new(delivery_fee: Money, tax_rate: Decimal) -> Self {
        Self {
            delivery_fee,
            tax_rate,
        }
    }
}

// ============================================================================
// Component computations
// ============================================================================

/// Sum of `unit_price * quantity` over the given line items.
#[must_use]
pub fn compute_subtotal(line_items: &[CartLineItem]) -> Money {
    line_items.iter().map(CartLineItem::line_total).sum()
}

/// The flat delivery fee for delivery orders; zero for pickup.
#[must_use]
pub const fn compute_delivery_fee(method: FulfillmentMethod, delivery_fee: Money) -> Money {
    match method {
        FulfillmentMethod::Delivery => delivery_fee,
        FulfillmentMethod::Pickup => Money::ZERO,
    }
}

/// Taxes on the subtotal, rounded half-up to the minor unit.
#[must_use]
pub fn compute_taxes(subtotal: Money, tax_rate: Decimal) -> Money {
    Money::from_decimal_rounded(subtotal.to_decimal() * tax_rate).max(Money::ZERO)
}

/// Resolve a tip choice into an amount.
///
/// Percentage tips are taken from the subtotal alone; fees and taxes never
/// feed the tip base. Rounded half-up, floored at zero.
#[must_use]
pub fn compute_tip(subtotal: Money, tip: Tip) -> Money {
    match tip {
        Tip::None => Money::ZERO,
        Tip::Percentage(percent) => {
            Money::from_decimal_rounded(subtotal.to_decimal() * percent / Decimal::ONE_HUNDRED)
                .max(Money::ZERO)
        }
        Tip::Fixed(amount) => amount.max(Money::ZERO),
    }
}

/// `subtotal + delivery_fee + taxes + tip`.
#[must_use]
pub fn compute_total(subtotal: Money, delivery_fee: Money, taxes: Money, tip: Money) -> Money {
    subtotal + delivery_fee + taxes + tip
}

// ============================================================================
// Breakdown
// ============================================================================

/// Price a cart end to end.
///
/// A zero subtotal short-circuits to the all-zero breakdown: an empty cart
/// owes nothing no matter the fulfillment method or tip choice.
#[must_use]
pub fn price_cart(
    line_items: &[CartLineItem],
    method: FulfillmentMethod,
    tip: Tip,
    config: &PricingConfig,
) -> PricingBreakdown {
    let subtotal = compute_subtotal(line_items);
    if subtotal.is_zero() {
        return PricingBreakdown::ZERO;
    }

    let delivery_fee = compute_delivery_fee(method, config.delivery_fee);
    let taxes = compute_taxes(subtotal, config.tax_rate);
    let tip = compute_tip(subtotal, tip);

    PricingBreakdown {
        subtotal,
        delivery_fee,
        taxes,
        tip,
        total: compute_total(subtotal, delivery_fee, taxes, tip),
    }
}
