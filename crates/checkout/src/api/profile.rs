//! Profile service client.
//!
//! Checkout reads the profile once to pre-fill fulfillment contact fields
//! (name, phone, delivery address) and writes it back when the user edits
//! them inline.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::{ApiError, base_url, bearer_client, ensure_success};
use crate::config::ApiConfig;

/// Account fields consumed by checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Profile {
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Default delivery address.
    #[serde(default)]
    pub address: Option<String>,
}

/// Client for the profile endpoints.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    client: reqwest::Client,
    base: String,
}

impl ProfileClient {
    /// Create a new profile client.
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

    /// Fetch the signed-in profile.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        let url = format!("{}/profile", self.base);

        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Replace the profile's contact fields, returning the stored result.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile, ApiError> {
        let url = format!("{}/profile", self.base);

        let response = self.client.put(&url).json(profile).send().await?;
        let response = ensure_success(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_tolerates_missing_fields() {
        let profile: Profile =
            serde_json::from_str(r#"{ "first_name": "Dana", "phone": "+15550100" }"#).unwrap();

        assert_eq!(profile.first_name.as_deref(), Some("Dana"));
        assert_eq!(profile.phone.as_deref(), Some("+15550100"));
        assert!(profile.email.is_none());
        assert!(profile.address.is_none());
    }

    #[test]
    fn test_profile_round_trips() {
        let profile = Profile {
            first_name: Some("Dana".to_string()),
            last_name: Some("Reyes".to_string()),
            email: Some("dana@example.com".to_string()),
            phone: Some("+15550100".to_string()),
            address: Some("12 Elm St".to_string()),
        };

        let json = serde_json::to_string(&profile).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
