//! Schedule availability commands.
//!
//! # Usage
//!
//! ```bash
//! plateful slots --order ord_8c41 --date 2026-09-01 --mode pickup
//! ```
//!
//! # Environment Variables
//!
//! - `PLATEFUL_API_BASE_URL` - Base URL of the ordering backend
//! - `PLATEFUL_API_TOKEN` - Bearer token for the backend

use chrono::NaiveDate;
use plateful_checkout::api::{ApiError, AvailabilityClient};
use plateful_checkout::config::ApiConfig;
use plateful_core::{FulfillmentMethod, OrderRef};

/// List the bookable slots for one order on one calendar date.
///
/// # Errors
///
/// Returns `ApiError` if the backend rejects the request or a slot label
/// cannot be parsed.
pub async fn list(
    api: &ApiConfig,
    order: &str,
    date: NaiveDate,
    method: FulfillmentMethod,
) -> Result<(), ApiError> {
    let client = AvailabilityClient::new(api)?;
    let order_ref = OrderRef::from(order);

    tracing::info!("Fetching {} slots for {} on {}", method, order_ref, date);
    let slots = client.fetch_schedule_list(&order_ref, date, method).await?;

    #[allow(clippy::print_stdout)]
    {
        if slots.is_empty() {
            println!("No bookable {method} slots on {date}.");
        } else {
            println!("{} {} slots on {}:", slots.len(), method, date);
            for slot in &slots {
                println!("  {}", slot.label());
            }
        }
    }

    Ok(())
}
