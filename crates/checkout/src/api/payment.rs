//! Payment-method store client.
//!
//! Card numbers never touch the profile service directly: saving a card is
//! two calls, first vaulting the raw card data for a one-time token, then
//! linking that token to the profile. A vault failure stops the flow before
//! the link call, so no partial card record can appear on the profile.

use plateful_core::CardId;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::{ApiError, base_url, bearer_client, ensure_success};
use crate::config::ApiConfig;

/// Errors from the two-phase card save.
#[derive(Debug, Error)]
pub enum CardVaultError {
    /// Tokenizing the card failed; nothing was stored anywhere.
    #[error("card vaulting failed: {0}")]
    Vault(#[source] ApiError),

    /// The card was vaulted but linking it to the profile failed. The
    /// unlinked token expires on its own; nothing shows on the profile.
    #[error("card could not be linked to the profile: {0}")]
    Link(#[source] ApiError),
}

/// A card already on file, as shown in checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCard {
    /// Backend identifier, used for selection and deletion.
    pub id: CardId,
    /// Displayable masked number, e.g. `**** **** **** 4242`.
    pub masked_pan: String,
    /// Card network, e.g. `visa`.
    pub brand: String,
    /// Whether the backend considers this the default card.
    pub is_default: bool,
}

/// Card data entered by the user, consumed by [`PaymentMethodsClient::save_card`].
///
/// The number and verification code are secrets; `Debug` shows them redacted.
#[derive(Debug, Clone)]
pub struct NewCard {
    /// Primary account number.
    pub pan: SecretString,
    /// Expiry month, 1-12.
    pub expiry_month: u8,
    /// Expiry year, four digits.
    pub expiry_year: u16,
    /// Card verification code.
    pub cvv: SecretString,
    /// Name on the card.
    pub holder_name: String,
}

/// Client for the saved-cards endpoints.
#[derive(Debug, Clone)]
pub struct PaymentMethodsClient {
    client: reqwest::Client,
    base: String,
}

impl PaymentMethodsClient {
    /// Create a new payment-methods client.
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

    /// List the cards on file for the signed-in profile.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_cards(&self) -> Result<Vec<SavedCard>, ApiError> {
        let url = format!("{}/profile/payment-methods", self.base);

        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response).await?;

        let body: CardListResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(body.cards.into_iter().map(SavedCard::from).collect())
    }

    /// Remove a card from the profile.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(card = %card_id))]
    pub async fn delete_card(&self, card_id: &CardId) -> Result<(), ApiError> {
        let url = format!("{}/profile/payment-methods/{}", self.base, card_id);

        let response = self.client.delete(&url).send().await?;
        ensure_success(response).await?;

        Ok(())
    }

    /// Save a new card: vault it, then link the token to the profile.
    ///
    /// The link call is only made after a successful vault call.
    ///
    /// # Errors
    ///
    /// Returns [`CardVaultError::Vault`] when tokenization fails and
    /// [`CardVaultError::Link`] when the profile link fails afterwards.
    #[instrument(skip_all)]
    pub async fn save_card(&self, card: &NewCard) -> Result<SavedCard, CardVaultError> {
        let token = self.vault_card(card).await.map_err(CardVaultError::Vault)?;
        debug!("Card vaulted, linking to profile");
        self.link_card(&token).await.map_err(CardVaultError::Link)
    }

    /// Phase one: exchange raw card data for a one-time token.
    async fn vault_card(&self, card: &NewCard) -> Result<String, ApiError> {
        let url = format!("{}/payments/m/cof", self.base);

        let body = serde_json::json!({
            "pan": card.pan.expose_secret(),
            "expiry_month": card.expiry_month,
            "expiry_year": card.expiry_year,
            "cvv": card.cvv.expose_secret(),
            "holder_name": card.holder_name,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let response = ensure_success(response).await?;

        let vaulted: VaultResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(vaulted.token)
    }

    /// Phase two: attach the vaulted token to the profile.
    async fn link_card(&self, token: &str) -> Result<SavedCard, ApiError> {
        let url = format!("{}/profile/payment-methods", self.base);

        let body = serde_json::json!({ "token": token });

        let response = self.client.post(&url).json(&body).send().await?;
        let response = ensure_success(response).await?;

        let linked: WireCard = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(SavedCard::from(linked))
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Wrapper for the card-list response.
#[derive(Debug, Deserialize)]
struct CardListResponse {
    cards: Vec<WireCard>,
}

/// One saved card as the backend reports it.
#[derive(Debug, Deserialize)]
struct WireCard {
    #[serde(rename = "_id")]
    id: String,
    data: WireCardData,
}

#[derive(Debug, Deserialize)]
struct WireCardData {
    masked_pan: String,
    bin: WireCardBin,
    #[serde(default)]
    is_default: bool,
}

#[derive(Debug, Deserialize)]
struct WireCardBin {
    brand: String,
}

/// Token handed back by the vaulting endpoint.
#[derive(Debug, Deserialize)]
struct VaultResponse {
    token: String,
}

impl From<WireCard> for SavedCard {
    fn from(card: WireCard) -> Self {
        Self {
            id: CardId::new(card.id),
            masked_pan: card.data.masked_pan,
            brand: card.data.bin.brand,
            is_default: card.data.is_default,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_card_list_wire_shape() {
        let body: CardListResponse = serde_json::from_str(
            r#"{
                "cards": [
                    {
                        "_id": "card-1",
                        "data": {
                            "masked_pan": "**** **** **** 4242",
                            "bin": { "brand": "visa" },
                            "is_default": true
                        }
                    },
                    {
                        "_id": "card-2",
                        "data": {
                            "masked_pan": "**** **** **** 1881",
                            "bin": { "brand": "mastercard" }
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        let cards: Vec<SavedCard> = body.cards.into_iter().map(SavedCard::from).collect();
        assert_eq!(cards.len(), 2);

        let first = cards.first().unwrap();
        assert_eq!(first.id, CardId::new("card-1"));
        assert_eq!(first.brand, "visa");
        assert!(first.is_default);
        // is_default defaults to false when the backend omits it
        assert!(!cards.get(1).unwrap().is_default);
    }

    #[test]
    fn test_new_card_debug_redacts_secrets() {
        let card = NewCard {
            pan: SecretString::from("4242424242424242"),
            expiry_month: 12,
            expiry_year: 2030,
            cvv: SecretString::from("123"),
            holder_name: "A Customer".to_string(),
        };

        let debug_output = format!("{card:?}");

        assert!(!debug_output.contains("4242424242424242"));
        assert!(!debug_output.contains("123"));
        assert!(debug_output.contains("A Customer"));
    }

    #[test]
    fn test_vault_error_display_names_phase() {
        let err = CardVaultError::Vault(ApiError::Api {
            status: 422,
            message: "luhn check failed".to_string(),
        });
        assert!(err.to_string().contains("vaulting failed"));

        let err = CardVaultError::Link(ApiError::Unauthorized);
        assert!(err.to_string().contains("linked to the profile"));
    }
}
