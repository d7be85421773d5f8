//! Cart line items and the snapshots other components consume.
//!
//! A line item represents one variant of a menu item: the item plus a
//! specific option/modifier selection. Line items are created and mutated
//! only by the cart store; everything downstream (pricing, assembly) works
//! on read-only [`CartSnapshot`] copies.

use serde::{Deserialize, Serialize};

use super::catalog::{MenuOption, Modifier};
use super::id::{MenuItemId, RestaurantId};
use super::money::Money;

/// Stable identity of a variant within one restaurant's cart.
///
/// Derived deterministically from the menu item id, the chosen option id (or
/// a sentinel when the item has none), and the chosen modifier ids sorted
/// ascending. Two additions with the same selections produce the same key
/// and therefore merge instead of duplicating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantKey(String);

impl VariantKey {
    /// Wrap an already-derived key. Derivation itself lives in the variant
    /// resolver so there is exactly one implementation of the key format.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry in a restaurant's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Variant identity; unique within one restaurant's cart.
    pub unique_id: VariantKey,
    /// The menu item this line was built from.
    pub menu_item_id: MenuItemId,
    /// The restaurant whose cart owns this line.
    pub restaurant_id: RestaurantId,
    /// Chosen single-select option, if the item has option groups.
    pub selected_option: Option<MenuOption>,
    /// Chosen add-on modifiers, sorted by id.
    pub selected_modifiers: Vec<Modifier>,
    /// Price per unit: option price (or base price) plus modifier prices.
    pub unit_price: Money,
    /// Number of units; always at least 1 while the line exists.
    pub quantity: u32,
    /// Free-text customer note.
    pub note: Option<String>,
}

impl CartLineItem {
    /// Line total: `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// A read-only copy of one restaurant's cart, taken at a point in time.
///
/// Pricing and order assembly receive snapshots, never the live cart, so the
/// store remains the only mutator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// The restaurant this snapshot belongs to.
    pub restaurant_id: RestaurantId,
    /// Line items in display (insertion) order.
    pub line_items: Vec<CartLineItem>,
}

impl CartSnapshot {
    /// Whether the snapshot holds no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Sum of quantities across all line items.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.line_items.iter().map(|line| line.quantity).sum()
    }
}
