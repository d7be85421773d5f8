//! Account profile commands.
//!
//! # Usage
//!
//! ```bash
//! plateful profile show
//! ```
//!
//! # Environment Variables
//!
//! - `PLATEFUL_API_BASE_URL` - Base URL of the ordering backend
//! - `PLATEFUL_API_TOKEN` - Bearer token for the backend

use plateful_checkout::api::{ApiError, ProfileClient};
use plateful_checkout::config::ApiConfig;

/// Show the account profile.
///
/// # Errors
///
/// Returns `ApiError` if the backend rejects the request.
pub async fn show(api: &ApiConfig) -> Result<(), ApiError> {
    let client = ProfileClient::new(api)?;
    let profile = client.get_profile().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("First name: {}", profile.first_name.as_deref().unwrap_or("-"));
        println!("Last name:  {}", profile.last_name.as_deref().unwrap_or("-"));
        println!("Email:      {}", profile.email.as_deref().unwrap_or("-"));
        println!("Phone:      {}", profile.phone.as_deref().unwrap_or("-"));
        println!("Address:    {}", profile.address.as_deref().unwrap_or("-"));
    }

    Ok(())
}
