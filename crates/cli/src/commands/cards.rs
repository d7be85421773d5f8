//! Saved payment method commands.
//!
//! # Usage
//!
//! ```bash
//! # List saved payment methods
//! plateful cards list
//!
//! # Delete a saved payment method
//! plateful cards delete --id card_19af
//! ```
//!
//! # Environment Variables
//!
//! - `PLATEFUL_API_BASE_URL` - Base URL of the ordering backend
//! - `PLATEFUL_API_TOKEN` - Bearer token for the backend

use plateful_checkout::api::{ApiError, PaymentMethodsClient};
use plateful_checkout::config::ApiConfig;
use plateful_core::CardId;

/// List the cards on file for the authenticated account.
///
/// # Errors
///
/// Returns `ApiError` if the backend rejects the request.
pub async fn list(api: &ApiConfig) -> Result<(), ApiError> {
    let client = PaymentMethodsClient::new(api)?;
    let cards = client.list_cards().await?;

    #[allow(clippy::print_stdout)]
    {
        if cards.is_empty() {
            println!("No saved payment methods.");
        } else {
            println!("{} saved payment methods:", cards.len());
            for card in &cards {
                let marker = if card.is_default { " (default)" } else { "" };
                println!("  {}  {} {}{}", card.id, card.brand, card.masked_pan, marker);
            }
        }
    }

    Ok(())
}

/// Delete one saved card by id.
///
/// # Errors
///
/// Returns `ApiError` if the backend rejects the request.
pub async fn delete(api: &ApiConfig, id: &str) -> Result<(), ApiError> {
    let client = PaymentMethodsClient::new(api)?;
    let card_id = CardId::from(id);

    client.delete_card(&card_id).await?;
    tracing::info!("Deleted payment method {}", card_id);

    Ok(())
}
