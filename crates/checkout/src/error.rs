//! Unified error handling for the checkout flow.
//!
//! Subsystems keep their own error types; `CheckoutError` is the single type
//! a caller driving a whole checkout needs to match on. The split that
//! matters is [`CheckoutError::is_recoverable`]: network-facing failures are
//! always recoverable at the UI boundary (retry or re-select), while variant
//! and configuration failures indicate bad catalog data or a bad deployment
//! and should be reported as defects, not shown as retry prompts.

use thiserror::Error;

use crate::api::{ApiError, CardVaultError};
use crate::config::ConfigError;
use crate::order::{AssembleError, SubmissionError};
use crate::schedule::ScheduleError;
use crate::variant::VariantError;

/// Application-level error type for checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Variant resolution failed; the catalog fed us a bad selection.
    #[error("Variant error: {0}")]
    Variant(#[from] VariantError),

    /// Scheduling selection was incomplete or invalid.
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Order assembly refused malformed input.
    #[error("Assembly error: {0}")]
    Assemble(#[from] AssembleError),

    /// Order placement failed; the cart is preserved.
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// Card vaulting or linking failed.
    #[error("Card error: {0}")]
    CardVault(#[from] CardVaultError),

    /// A backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CheckoutError {
    /// Whether the user can get past this error by retrying or re-selecting.
    ///
    /// Non-recoverable errors are contract violations (catalog or
    /// deployment); surfacing a retry button for them would be a lie.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Variant(_) | Self::Config(_) => false,
            Self::Schedule(_)
            | Self::Assemble(_)
            | Self::Submission(_)
            | Self::CardVault(_)
            | Self::Api(_) => true,
        }
    }

    /// Short message suitable for direct display.
    ///
    /// Internal detail (backend bodies, config variable names) stays out of
    /// the user-facing string.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Variant(_) => "This item can't be added right now".to_string(),
            Self::Schedule(err) => err.to_string(),
            Self::Assemble(err) => err.to_string(),
            Self::Submission(_) => {
                "We couldn't place your order. Your cart is unchanged - please try again".to_string()
            }
            Self::CardVault(_) => "We couldn't save your card. No charge was made".to_string(),
            Self::Api(_) => "Something went wrong talking to the kitchen. Please retry".to_string(),
            Self::Config(_) => "The app is misconfigured".to_string(),
        }
    }
}

/// Result type alias for `CheckoutError`.
pub type Result<T> = std::result::Result<T, CheckoutError>;
