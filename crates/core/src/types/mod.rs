//! Core types for Plateful.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod fulfillment;
pub mod id;
pub mod money;
pub mod order;

pub use cart::{CartLineItem, CartSnapshot, VariantKey};
pub use catalog::{MenuItem, MenuOption, Modifier, ModifierGroup, OptionGroup, Restaurant};
pub use fulfillment::{FulfillmentMethod, FulfillmentMode, FulfillmentSelection, ScheduleSlot};
pub use id::*;
pub use money::{CurrencyCode, Money, MoneyError};
pub use order::{Order, PricingBreakdown, SubmissionResult, Tip};
