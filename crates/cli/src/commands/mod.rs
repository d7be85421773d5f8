//! CLI command implementations.

pub mod cards;
pub mod profile;
pub mod slots;
