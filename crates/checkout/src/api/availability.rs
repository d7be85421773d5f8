//! Availability service client for schedule slots.
//!
//! The service reports bookable start times per date and fulfillment method
//! as twelve-hour labels (`"1:30 PM"`); this client parses them into
//! [`ScheduleSlot`]s. An empty list is a normal answer for a fully booked or
//! closed day, not an error.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use plateful_core::{FulfillmentMethod, OrderRef, ScheduleSlot};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::api::{ApiError, base_url, bearer_client, ensure_success};
use crate::config::ApiConfig;
use crate::schedule::SlotSource;

/// Time-of-day shape the service speaks, e.g. `1:30 PM`.
const SLOT_TIME_FORMAT: &str = "%I:%M %p";

/// Client for the schedule-availability endpoints.
#[derive(Debug, Clone)]
pub struct AvailabilityClient {
    client: reqwest::Client,
    base: String,
}

impl AvailabilityClient {
    /// Create a new availability client.
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

    /// Fetch the bookable slots for one order reference, date and method.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or a slot label cannot be parsed.
    #[instrument(skip(self), fields(order = %order_ref))]
    pub async fn fetch_schedule_list(
        &self,
        order_ref: &OrderRef,
        date: NaiveDate,
        method: FulfillmentMethod,
    ) -> Result<Vec<ScheduleSlot>, ApiError> {
        let url = format!("{}/orders/{}/schedule-list", self.base, order_ref);
        let date_param = date.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("mode", method.as_str()), ("date", date_param.as_str())])
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let body: ScheduleListResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        let slots = body
            .slots
            .into_iter()
            .map(|slot| parse_slot(&slot.st))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = slots.len(), %date, "Fetched schedule slots");
        Ok(slots)
    }

    /// Scope this client to one order, yielding a
    /// [`SlotSource`](crate::schedule::SlotSource) the scheduling session
    /// can drive.
    #[must_use]
    pub fn for_order(&self, order_ref: OrderRef) -> OrderAvailability {
        OrderAvailability {
            client: self.clone(),
            order_ref,
        }
    }
}

/// An [`AvailabilityClient`] bound to one order reference.
#[derive(Debug, Clone)]
pub struct OrderAvailability {
    client: AvailabilityClient,
    order_ref: OrderRef,
}

#[async_trait]
impl SlotSource for OrderAvailability {
    async fn fetch_slots(
        &self,
        date: NaiveDate,
        method: FulfillmentMethod,
    ) -> Result<Vec<ScheduleSlot>, ApiError> {
        self.client
            .fetch_schedule_list(&self.order_ref, date, method)
            .await
    }
}

fn parse_slot(label: &str) -> Result<ScheduleSlot, ApiError> {
    NaiveTime::parse_from_str(label.trim(), SLOT_TIME_FORMAT)
        .map(ScheduleSlot::new)
        .map_err(|e| ApiError::Parse(format!("bad slot time {label:?}: {e}")))
}

/// Wrapper for the schedule-list response.
#[derive(Debug, Deserialize)]
struct ScheduleListResponse {
    slots: Vec<WireSlot>,
}

/// One slot as the service reports it.
#[derive(Debug, Deserialize)]
struct WireSlot {
    st: String,
}
