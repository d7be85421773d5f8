//! Ordering service client for order placement.
//!
//! Converts an assembled [`Order`] into the backend's wire shape: money
//! travels as exact decimal strings (`"46.50"`), never as floats, and the
//! scheduled time as RFC 3339 with the local offset.

use async_trait::async_trait;
use plateful_core::{CartLineItem, FulfillmentMode, Money, Order, OrderRef, SubmissionResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::api::{ApiError, base_url, bearer_client, ensure_success};
use crate::config::ApiConfig;
use crate::order::OrderSubmitter;

/// Client for the order-placement endpoint.
#[derive(Debug, Clone)]
pub struct OrdersClient {
    client: reqwest::Client,
    base: String,
}

impl OrdersClient {
    /// Create a new orders client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: bearer_client(config)?,
            base: base_url(config),
        })
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or is rejected.
    #[instrument(skip_all, fields(restaurant = %order.restaurant_id))]
    pub async fn submit(&self, order: &Order) -> Result<SubmissionResult, ApiError> {
        let url = format!("{}/orders", self.base);
        let payload = WireOrder::from(order);

        let response = self.client.post(&url).json(&payload).send().await?;
        let response = ensure_success(response).await?;

        let placed: PlacedResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        debug!(order_id = %placed.order_id, status = %placed.status, "Order accepted");
        Ok(SubmissionResult {
            order_id: OrderRef::new(placed.order_id),
            status: placed.status,
        })
    }
}

#[async_trait]
impl OrderSubmitter for OrdersClient {
    async fn submit_order(&self, order: &Order) -> Result<SubmissionResult, ApiError> {
        self.submit(order).await
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Exact decimal string for the wire, e.g. `"46.50"`.
fn money_string(amount: Money) -> String {
    amount.to_decimal().to_string()
}

#[derive(Debug, Serialize)]
struct WireOrder {
    restaurant_id: String,
    line_items: Vec<WireLineItem>,
    fulfillment: WireFulfillment,
    pricing: WirePricing,
    payment_method_id: String,
    created_at: String,
}

#[derive(Debug, Serialize)]
struct WireLineItem {
    menu_item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    option_id: Option<String>,
    modifier_ids: Vec<String>,
    unit_price: String,
    quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireFulfillment {
    method: String,
    mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

#[derive(Debug, Serialize)]
struct WirePricing {
    subtotal: String,
    delivery_fee: String,
    taxes: String,
    tip: String,
    total: String,
}

#[derive(Debug, Deserialize)]
struct PlacedResponse {
    order_id: String,
    status: String,
}

impl From<&Order> for WireOrder {
    fn from(order: &Order) -> Self {
        Self {
            restaurant_id: order.restaurant_id.as_str().to_string(),
            line_items: order.line_items.iter().map(WireLineItem::from).collect(),
            fulfillment: WireFulfillment {
                method: order.fulfillment.method.as_str().to_string(),
                mode: match order.fulfillment.mode {
                    FulfillmentMode::Immediate => "immediate".to_string(),
                    FulfillmentMode::Scheduled => "scheduled".to_string(),
                },
                scheduled_time: order
                    .fulfillment
                    .scheduled_time
                    .map(|time| time.to_rfc3339()),
                address: order.fulfillment.address.clone(),
            },
            pricing: WirePricing {
                subtotal: money_string(order.pricing.subtotal),
                delivery_fee: money_string(order.pricing.delivery_fee),
                taxes: money_string(order.pricing.taxes),
                tip: money_string(order.pricing.tip),
                total: money_string(order.pricing.total),
            },
            payment_method_id: order.payment_method_ref.as_str().to_string(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

impl From<&CartLineItem> for WireLineItem {
    fn from(item: &CartLineItem) -> Self {
        Self {
            menu_item_id: item.menu_item_id.as_str().to_string(),
            option_id: item
                .selected_option
                .as_ref()
                .map(|option| option.id.as_str().to_string()),
            modifier_ids: item
                .selected_modifiers
                .iter()
                .map(|modifier| modifier.id.as_str().to_string())
                .collect(),
            unit_price: money_string(item.unit_price),
            quantity: item.quantity,
            note: item.note.clone(),
        }
    }
}
