//! Plateful Core - Shared types library.
//!
//! This crate provides the common types used across all Plateful components:
//! - `checkout` - Cart, pricing, scheduling, and order-assembly engines
//! - `cli` - Command-line tools for smoke testing against a live backend
//!
//! # Architecture
//!
//! The core crate contains only data types - no I/O, no HTTP clients, no
//! clocks. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, money, the catalog model, cart line items,
//!   fulfillment selections, and assembled orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
