//! REST clients for the ordering backend.
//!
//! One client per collaborator: [`AvailabilityClient`] (schedule slots),
//! [`PaymentMethodsClient`] (saved cards), [`ProfileClient`] (contact info)
//! and [`OrdersClient`] (order placement). All of them authenticate with the
//! bearer token from [`ApiConfig`](crate::config::ApiConfig) and share the
//! same error shape.

pub mod availability;
pub mod orders;
pub mod payment;
pub mod profile;

pub use availability::{AvailabilityClient, OrderAvailability};
pub use orders::OrdersClient;
pub use payment::{CardVaultError, NewCard, PaymentMethodsClient, SavedCard};
pub use profile::{Profile, ProfileClient};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::ApiConfig;

/// Errors that can occur when talking to the ordering backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The bearer token was rejected.
    #[error("Unauthorized: sign in again")]
    Unauthorized,

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Build an HTTP client with the bearer token as a default header.
///
/// # Errors
///
/// Returns error if the token is not a valid header value or the client
/// fails to build.
pub(crate) fn bearer_client(config: &ApiConfig) -> Result<reqwest::Client, ApiError> {
    let mut headers = HeaderMap::new();

    let auth_value = format!("Bearer {}", config.auth_token.expose_secret());
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth_value)
            .map_err(|e| ApiError::Parse(format!("Invalid token format: {e}")))?,
    );

    let client = reqwest::Client::builder().default_headers(headers).build()?;
    Ok(client)
}

/// The backend base URL as a string without a trailing slash, ready for
/// `format!` paths.
pub(crate) fn base_url(config: &ApiConfig) -> String {
    config.base_url.as_str().trim_end_matches('/').to_string()
}

/// Turn a non-success response into an error, mapping 401 to
/// [`ApiError::Unauthorized`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}
