//! Per-restaurant carts with variant merging.
//!
//! One [`CartStore`] holds every restaurant's cart at once; starting an order
//! at a second restaurant never discards the first restaurant's items. All
//! mutation goes through the store so the merge invariant (one line item per
//! variant key per restaurant) cannot be broken from outside.

use std::collections::HashMap;

use plateful_core::{
    CartLineItem, CartSnapshot, MenuItem, MenuOption, Modifier, Money, RestaurantId, VariantKey,
};

use crate::variant::{self, VariantError};

// ============================================================================
// LineItemDraft
// ============================================================================

/// Everything the customer picked for one addition, before resolution.
///
/// The draft borrows the catalog item (the store never keeps it) and owns the
/// selections, which move into the created line item.
#[derive(Debug, Clone)]
pub struct LineItemDraft<'a> {
    /// Catalog item being added.
    pub menu_item: &'a MenuItem,
    /// Chosen option, if the item has option groups.
    pub selected_option: Option<MenuOption>,
    /// Chosen add-ons, any order.
    pub selected_modifiers: Vec<Modifier>,
    /// Free-text kitchen note. Not part of the variant identity.
    pub note: Option<String>,
}

impl<'a> LineItemDraft<'a> {
    /// A draft with no option, no modifiers and no note.
    #[must_use]
    pub const fn plain(menu_item: &'a MenuItem) -> Self {
        Self {
            menu_item,
            selected_option: None,
            selected_modifiers: Vec::new(),
            note: None,
        }
    }
}

// ============================================================================
// CartStore
// ============================================================================

/// All carts, keyed by restaurant.
///
/// Operations are total: unknown restaurant or variant keys behave as
/// operations on an empty cart, never as errors.
#[derive(Debug, Default, Clone)]
pub struct CartStore {
    carts: HashMap<RestaurantId, Vec<CartLineItem>>,
}

impl CartStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selection to a restaurant's cart.
    ///
    /// The draft is resolved to its variant key; if the cart already holds a
    /// line item with that key its quantity is incremented by
    /// `quantity_delta` (and its existing note kept), otherwise a new line
    /// item is appended with `quantity = quantity_delta`. A delta of zero
    /// resolves the variant but changes nothing.
    ///
    /// Returns the variant key so callers can address the line item later.
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::MissingRequiredOption`] when the item mandates
    /// an option and the draft has none; the cart is unchanged.
    pub fn add(
        &mut self,
        restaurant_id: &RestaurantId,
        draft: LineItemDraft<'_>,
        quantity_delta: u32,
    ) -> Result<VariantKey, VariantError> {
        let resolved = variant::resolve(
            draft.menu_item,
            draft.selected_option.as_ref(),
            &draft.selected_modifiers,
        )?;

        if quantity_delta == 0 {
            return Ok(resolved.key);
        }

        let items = self.carts.entry(restaurant_id.clone()).or_default();

        if let Some(existing) = items
            .iter_mut()
            .find(|item| item.unique_id == resolved.key)
        {
            existing.quantity = existing.quantity.saturating_add(quantity_delta);
        } else {
            items.push(CartLineItem {
                unique_id: resolved.key.clone(),
                menu_item_id: draft.menu_item.id.clone(),
                restaurant_id: restaurant_id.clone(),
                selected_option: draft.selected_option,
                selected_modifiers: draft.selected_modifiers,
                unit_price: resolved.unit_price,
                quantity: quantity_delta,
                note: draft.note,
            });
        }

        Ok(resolved.key)
    }

    /// Delete a line item entirely, whatever its quantity.
    pub fn remove(&mut self, restaurant_id: &RestaurantId, unique_id: &VariantKey) {
        if let Some(items) = self.carts.get_mut(restaurant_id) {
            items.retain(|item| item.unique_id != *unique_id);
            if items.is_empty() {
                self.carts.remove(restaurant_id);
            }
        }
    }

    /// Set a line item's quantity directly (not an increment).
    ///
    /// A quantity of zero removes the line item, matching [`Self::remove`].
    pub fn update_quantity(
        &mut self,
        restaurant_id: &RestaurantId,
        unique_id: &VariantKey,
        new_quantity: u32,
    ) {
        if new_quantity == 0 {
            self.remove(restaurant_id, unique_id);
            return;
        }

        if let Some(items) = self.carts.get_mut(restaurant_id)
            && let Some(item) = items.iter_mut().find(|item| item.unique_id == *unique_id)
        {
            item.quantity = new_quantity;
        }
    }

    /// Empty one restaurant's cart; every other cart is untouched.
    pub fn clear(&mut self, restaurant_id: &RestaurantId) {
        self.carts.remove(restaurant_id);
    }

    /// Sum of quantities across a restaurant's line items.
    #[must_use]
    pub fn total_items(&self, restaurant_id: &RestaurantId) -> u32 {
        self.line_items(restaurant_id)
            .iter()
            .fold(0_u32, |sum, item| sum.saturating_add(item.quantity))
    }

    /// Sum of `unit_price * quantity` across a restaurant's line items.
    ///
    /// Always equals the pricing engine's subtotal for the same cart.
    #[must_use]
    pub fn total_price(&self, restaurant_id: &RestaurantId) -> Money {
        self.line_items(restaurant_id)
            .iter()
            .map(CartLineItem::line_total)
            .sum()
    }

    /// A restaurant's line items in insertion order; empty for unknown ids.
    #[must_use]
    pub fn line_items(&self, restaurant_id: &RestaurantId) -> &[CartLineItem] {
        self.carts
            .get(restaurant_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Read-only copy of one restaurant's cart for pricing and assembly.
    #[must_use]
    pub fn snapshot(&self, restaurant_id: &RestaurantId) -> CartSnapshot {
        CartSnapshot {
            restaurant_id: restaurant_id.clone(),
            line_items: self.line_items(restaurant_id).to_vec(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use plateful_core::{ModifierId, OptionGroup};

    fn restaurant(tag: &str) -> RestaurantId {
        RestaurantId::new(tag)
    }

    fn large() -> MenuOption {
        MenuOption {
            id: "large".into(),
            name: "Large".to_string(),
            localized_name: None,
            price: Money::from_minor(1200),
        }
    }

    fn burger() -> MenuItem {
        MenuItem {
            id: "burger".into(),
            name: "Burger".to_string(),
            localized_name: None,
            base_price: Money::from_minor(1000),
            option_groups: vec![OptionGroup {
                id: "size".into(),
                name: "Size".to_string(),
                localized_name: None,
                options: vec![large()],
            }],
            modifier_groups: Vec::new(),
        }
    }

    fn fries() -> MenuItem {
        MenuItem {
            id: "fries".into(),
            name: "Fries".to_string(),
            localized_name: None,
            base_price: Money::from_minor(450),
            option_groups: Vec::new(),
            modifier_groups: Vec::new(),
        }
    }

    fn modifier(id: &str, minor: i64) -> Modifier {
        Modifier {
            id: ModifierId::new(id),
            name: id.to_string(),
            localized_name: None,
            price: Money::from_minor(minor),
        }
    }

    fn large_burger_draft(item: &MenuItem) -> LineItemDraft<'_> {
        LineItemDraft {
            menu_item: item,
            selected_option: Some(large()),
            selected_modifiers: vec![modifier("bacon", 150), modifier("cheese", 200)],
            note: None,
        }
    }

    #[test]
    fn test_identical_additions_merge() {
        let mut store = CartStore::new();
        let rid = restaurant("r1");
        let item = burger();

        let first = store.add(&rid, large_burger_draft(&item), 1).unwrap();
        let second = store.add(&rid, large_burger_draft(&item), 1).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.line_items(&rid).len(), 1);
        assert_eq!(store.line_items(&rid).first().unwrap().quantity, 2);
    }

    #[test]
    fn test_differing_modifier_makes_new_line() {
        let mut store = CartStore::new();
        let rid = restaurant("r1");
        let item = burger();

        store.add(&rid, large_burger_draft(&item), 1).unwrap();

        let mut other = large_burger_draft(&item);
        other.selected_modifiers.pop();
        store.add(&rid, other, 1).unwrap();

        assert_eq!(store.line_items(&rid).len(), 2);
    }

    #[test]
    fn test_spec_example_totals() {
        // Base 10.00 burger, Large option 12.00, modifiers 1.50 and 2.00,
        // quantity 3 -> unit 15.50, line total 46.50.
        let mut store = CartStore::new();
        let rid = restaurant("r1");
        let item = burger();

        store.add(&rid, large_burger_draft(&item), 3).unwrap();

        let line = store.line_items(&rid).first().unwrap();
        assert_eq!(line.unit_price, Money::from_minor(1550));
        assert_eq!(store.total_items(&rid), 3);
        assert_eq!(store.total_price(&rid), Money::from_minor(4650));
    }

    #[test]
    fn test_update_quantity_sets_not_increments() {
        let mut store = CartStore::new();
        let rid = restaurant("r1");
        let item = fries();

        let key = store.add(&rid, LineItemDraft::plain(&item), 2).unwrap();
        store.update_quantity(&rid, &key, 5);

        assert_eq!(store.total_items(&rid), 5);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut store = CartStore::new();
        let rid = restaurant("r1");
        let item = fries();

        let key = store.add(&rid, LineItemDraft::plain(&item), 2).unwrap();
        store.update_quantity(&rid, &key, 0);

        assert!(store.line_items(&rid).is_empty());
        assert_eq!(store.total_items(&rid), 0);
    }

    #[test]
    fn test_remove_deletes_regardless_of_quantity() {
        let mut store = CartStore::new();
        let rid = restaurant("r1");
        let item = fries();

        let key = store.add(&rid, LineItemDraft::plain(&item), 7).unwrap();
        store.remove(&rid, &key);

        assert_eq!(store.total_price(&rid), Money::ZERO);
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let mut store = CartStore::new();
        let rid = restaurant("ghost");
        let key = VariantKey::new("nothing:none");

        store.remove(&rid, &key);
        store.update_quantity(&rid, &key, 3);
        store.clear(&rid);

        assert_eq!(store.total_items(&rid), 0);
        assert_eq!(store.total_price(&rid), Money::ZERO);
    }

    #[test]
    fn test_carts_are_independent_per_restaurant() {
        let mut store = CartStore::new();
        let first = restaurant("r1");
        let second = restaurant("r2");
        let item = fries();

        store.add(&first, LineItemDraft::plain(&item), 1).unwrap();
        store.add(&second, LineItemDraft::plain(&item), 4).unwrap();

        store.clear(&first);

        assert_eq!(store.total_items(&first), 0);
        assert_eq!(store.total_items(&second), 4);
    }

    #[test]
    fn test_merge_keeps_existing_note() {
        let mut store = CartStore::new();
        let rid = restaurant("r1");
        let item = fries();

        let mut first = LineItemDraft::plain(&item);
        first.note = Some("no salt".to_string());
        store.add(&rid, first, 1).unwrap();

        let mut second = LineItemDraft::plain(&item);
        second.note = Some("extra salt".to_string());
        store.add(&rid, second, 1).unwrap();

        let items = store.line_items(&rid);
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().note.as_deref(), Some("no salt"));
    }

    #[test]
    fn test_zero_delta_changes_nothing() {
        let mut store = CartStore::new();
        let rid = restaurant("r1");
        let item = fries();

        store.add(&rid, LineItemDraft::plain(&item), 0).unwrap();

        assert!(store.line_items(&rid).is_empty());
    }
}
