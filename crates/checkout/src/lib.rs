//! Plateful checkout engine.
//!
//! Everything between "tap add to cart" and "order placed" lives here:
//!
//! - [`cart`] - Per-restaurant carts with variant merging
//! - [`variant`] - Line-item identity and unit pricing
//! - [`pricing`] - Subtotal, fees, taxes, tip and total
//! - [`schedule`] - Fulfillment-time selection against the availability service
//! - [`order`] - Assembly, validation and submission
//! - [`api`] - REST clients for the ordering backend
//!
//! The crate is UI-free and runtime-agnostic apart from the `api` clients,
//! which need a Tokio runtime.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod order;
pub mod pricing;
pub mod schedule;
pub mod variant;
