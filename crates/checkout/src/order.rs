//! Order assembly, validation and submission.
//!
//! [`assemble`] is the only place an [`Order`] is created; it refuses
//! malformed input instead of letting a bad order reach the wire. [`submit`]
//! owns the one cart side effect in the crate: the submitted restaurant's
//! cart is cleared exactly once on success and left untouched on failure, so
//! re-entering checkout never resurfaces placed items and a failed attempt
//! can be retried as-is.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use plateful_core::{
    CardId, CartSnapshot, FulfillmentMode, FulfillmentSelection, Order, PricingBreakdown,
    SubmissionResult,
};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::ApiError;
use crate::cart::CartStore;

/// Why an order could not be assembled.
///
/// Both are blocking validation failures to surface to the user, never
/// conditions to paper over.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssembleError {
    /// The cart snapshot has no line items.
    #[error("cannot assemble an order from an empty cart")]
    EmptyCart,

    /// Scheduled fulfillment without a confirmed time.
    #[error("scheduled fulfillment requires a confirmed time")]
    IncompleteFulfillment,
}

/// Order placement failed; the cart is preserved for retry.
#[derive(Debug, Error)]
#[error("order submission failed: {0}")]
pub struct SubmissionError(#[from] pub ApiError);

/// Where assembled orders are sent.
///
/// The production implementation is
/// [`OrdersClient`](crate::api::OrdersClient); tests substitute scripted
/// submitters.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Place one order with the ordering service.
    async fn submit_order(&self, order: &Order) -> Result<SubmissionResult, ApiError>;
}

/// Build an immutable [`Order`] from checkout state, stamped `created_at`.
///
/// # Errors
///
/// Returns [`AssembleError::EmptyCart`] for a snapshot with no line items,
/// and [`AssembleError::IncompleteFulfillment`] when `fulfillment` is
/// scheduled but carries no time.
pub fn assemble_at(
    snapshot: CartSnapshot,
    fulfillment: FulfillmentSelection,
    pricing: PricingBreakdown,
    payment_method_ref: CardId,
    created_at: DateTime<Local>,
) -> Result<Order, AssembleError> {
    if snapshot.is_empty() {
        return Err(AssembleError::EmptyCart);
    }
    if fulfillment.mode == FulfillmentMode::Scheduled && fulfillment.scheduled_time.is_none() {
        return Err(AssembleError::IncompleteFulfillment);
    }

    Ok(Order {
        restaurant_id: snapshot.restaurant_id,
        line_items: snapshot.line_items,
        fulfillment,
        pricing,
        payment_method_ref,
        created_at,
    })
}

/// [`assemble_at`] stamped with the current wall clock.
///
/// # Errors
///
/// Same as [`assemble_at`].
pub fn assemble(
    snapshot: CartSnapshot,
    fulfillment: FulfillmentSelection,
    pricing: PricingBreakdown,
    payment_method_ref: CardId,
) -> Result<Order, AssembleError> {
    assemble_at(
        snapshot,
        fulfillment,
        pricing,
        payment_method_ref,
        Local::now(),
    )
}

/// Submit an order and settle the cart.
///
/// On success the order's restaurant cart is cleared exactly once before the
/// caller sees the result. On failure the cart is untouched. Debouncing a
/// second submission while one is in flight is the caller's job; two
/// assembled orders with identical contents compare equal, which makes
/// accidental duplicates detectable.
///
/// # Errors
///
/// Returns [`SubmissionError`] when the ordering service rejects or fails
/// the placement.
#[instrument(skip_all, fields(restaurant = %order.restaurant_id, total = %order.pricing.total))]
pub async fn submit(
    order: &Order,
    submitter: &(impl OrderSubmitter + ?Sized),
    cart: &mut CartStore,
) -> Result<SubmissionResult, SubmissionError> {
    let result = submitter.submit_order(order).await?;

    cart.clear(&order.restaurant_id);
    debug!(order_id = %result.order_id, "Order placed, cart cleared");

    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::cart::LineItemDraft;
    use plateful_core::{FulfillmentMethod, MenuItem, Money, OrderRef, RestaurantId};

    struct ScriptedSubmitter {
        succeed: bool,
        calls: AtomicU32,
    }

    impl ScriptedSubmitter {
        const fn new(succeed: bool) -> Self {
            Self {
                succeed,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OrderSubmitter for ScriptedSubmitter {
        async fn submit_order(&self, _order: &Order) -> Result<SubmissionResult, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(SubmissionResult {
                    order_id: OrderRef::new("ord-1"),
                    status: "received".to_string(),
                })
            } else {
                Err(ApiError::Api {
                    status: 502,
                    message: "kitchen offline".to_string(),
                })
            }
        }
    }

    fn item(minor: i64) -> MenuItem {
        MenuItem {
            id: "burger".into(),
            name: "Burger".to_string(),
            localized_name: None,
            base_price: Money::from_minor(minor),
            option_groups: Vec::new(),
            modifier_groups: Vec::new(),
        }
    }

    fn loaded_cart(rid: &RestaurantId) -> CartStore {
        let mut store = CartStore::new();
        let burger = item(1000);
        store.add(rid, LineItemDraft::plain(&burger), 2).unwrap();
        store
    }

    fn breakdown() -> PricingBreakdown {
        PricingBreakdown {
            subtotal: Money::from_minor(2000),
            delivery_fee: Money::ZERO,
            taxes: Money::from_minor(100),
            tip: Money::ZERO,
            total: Money::from_minor(2100),
        }
    }

    #[test]
    fn test_assemble_rejects_empty_cart() {
        let rid = RestaurantId::new("r1");
        let empty = CartStore::new().snapshot(&rid);

        let err = assemble(
            empty,
            FulfillmentSelection::immediate(FulfillmentMethod::Pickup),
            PricingBreakdown::ZERO,
            CardId::new("card-1"),
        )
        .unwrap_err();

        assert_eq!(err, AssembleError::EmptyCart);
    }

    #[test]
    fn test_assemble_rejects_scheduled_without_time() {
        let rid = RestaurantId::new("r1");
        let snapshot = loaded_cart(&rid).snapshot(&rid);

        let fulfillment = FulfillmentSelection {
            method: FulfillmentMethod::Pickup,
            mode: FulfillmentMode::Scheduled,
            scheduled_time: None,
            address: None,
        };

        let err = assemble(snapshot, fulfillment, breakdown(), CardId::new("card-1")).unwrap_err();
        assert_eq!(err, AssembleError::IncompleteFulfillment);
    }

    #[test]
    fn test_assemble_preserves_checkout_state() {
        let rid = RestaurantId::new("r1");
        let snapshot = loaded_cart(&rid).snapshot(&rid);

        let order = assemble(
            snapshot,
            FulfillmentSelection::immediate(FulfillmentMethod::Pickup),
            breakdown(),
            CardId::new("card-1"),
        )
        .unwrap();

        assert_eq!(order.restaurant_id, rid);
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(order.pricing.total, Money::from_minor(2100));
        assert_eq!(order.payment_method_ref, CardId::new("card-1"));
    }

    #[test]
    fn test_identical_assemblies_compare_equal() {
        let rid = RestaurantId::new("r1");
        let store = loaded_cart(&rid);
        let at = Local::now();

        let build = || {
            assemble_at(
                store.snapshot(&rid),
                FulfillmentSelection::immediate(FulfillmentMethod::Pickup),
                breakdown(),
                CardId::new("card-1"),
                at,
            )
            .unwrap()
        };

        assert_eq!(build(), build());
    }

    #[tokio::test]
    async fn test_successful_submit_clears_cart_once() {
        let rid = RestaurantId::new("r1");
        let mut store = loaded_cart(&rid);
        let order = assemble(
            store.snapshot(&rid),
            FulfillmentSelection::immediate(FulfillmentMethod::Pickup),
            breakdown(),
            CardId::new("card-1"),
        )
        .unwrap();

        let submitter = ScriptedSubmitter::new(true);
        let result = submit(&order, &submitter, &mut store).await.unwrap();

        assert_eq!(result.status, "received");
        assert_eq!(submitter.calls(), 1);
        assert_eq!(store.total_items(&rid), 0);
    }

    #[tokio::test]
    async fn test_failed_submit_leaves_cart_untouched() {
        let rid = RestaurantId::new("r1");
        let mut store = loaded_cart(&rid);
        let before = store.snapshot(&rid);
        let order = assemble(
            before.clone(),
            FulfillmentSelection::immediate(FulfillmentMethod::Pickup),
            breakdown(),
            CardId::new("card-1"),
        )
        .unwrap();

        let submitter = ScriptedSubmitter::new(false);
        let err = submit(&order, &submitter, &mut store).await.unwrap_err();

        assert!(err.to_string().contains("submission failed"));
        assert_eq!(store.snapshot(&rid), before);
        assert_eq!(store.total_items(&rid), 2);
    }
}
