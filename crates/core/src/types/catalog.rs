//! Catalog types supplied by the restaurant/menu collaborator.
//!
//! These shapes are immutable inputs: the checkout core never creates or
//! edits catalog content, it only reads prices and identities from it.
//! Content ingestion itself lives outside this workspace.

use serde::{Deserialize, Serialize};

use super::id::{MenuItemId, ModifierId, OptionId, RestaurantId};
use super::money::Money;

// =============================================================================
// Restaurant
// =============================================================================

/// A restaurant on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Restaurant ID.
    pub id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Street address shown on pickup screens.
    pub address: String,
    /// Whether pickup orders are accepted.
    pub pickup_enabled: bool,
    /// Whether delivery orders are accepted.
    pub delivery_enabled: bool,
}

// =============================================================================
// Menu Items
// =============================================================================

/// A purchasable menu item with its customization groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Menu item ID.
    pub id: MenuItemId,
    /// Canonical name.
    pub name: String,
    /// Localized display name, when the catalog provides one.
    pub localized_name: Option<String>,
    /// Price when no option replaces it.
    pub base_price: Money,
    /// Single-select option groups (e.g. size). A non-empty list means the
    /// item mandates an option choice.
    pub option_groups: Vec<OptionGroup>,
    /// Multi-select modifier groups (e.g. toppings).
    pub modifier_groups: Vec<ModifierGroup>,
}

impl MenuItem {
    /// Whether this item mandates choosing an option before it can be added
    /// to a cart.
    #[must_use]
    pub fn requires_option(&self) -> bool {
        !self.option_groups.is_empty()
    }
}

/// A mutually-exclusive, single-select group of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionGroup {
    /// Group ID.
    pub id: OptionId,
    /// Group name (e.g. "Size").
    pub name: String,
    /// Localized group name.
    pub localized_name: Option<String>,
    /// The selectable options.
    pub options: Vec<MenuOption>,
}

/// One choice within an [`OptionGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    /// Option ID.
    pub id: OptionId,
    /// Option name (e.g. "Large").
    pub name: String,
    /// Localized option name.
    pub localized_name: Option<String>,
    /// Absolute replacement price for the item when this option is chosen.
    pub price: Money,
}

/// A multi-select group of add-on modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierGroup {
    /// Group ID.
    pub id: ModifierId,
    /// Group name (e.g. "Extras").
    pub name: String,
    /// Localized group name.
    pub localized_name: Option<String>,
    /// The selectable modifiers.
    pub modifiers: Vec<Modifier>,
}

/// One add-on within a [`ModifierGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Modifier ID.
    pub id: ModifierId,
    /// Modifier name (e.g. "Extra cheese").
    pub name: String,
    /// Localized modifier name.
    pub localized_name: Option<String>,
    /// Additive price on top of the item/option price.
    pub price: Money,
}
