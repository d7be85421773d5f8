//! Line-item identity and unit pricing.
//!
//! A *variant* is one menu item plus one chosen option and any set of chosen
//! modifiers. [`resolve`] turns a variant into the two facts the cart needs:
//! a stable key (so identical selections merge instead of duplicating) and
//! the computed unit price.

use plateful_core::{MenuItem, MenuItemId, MenuOption, Modifier, Money, VariantKey};
use thiserror::Error;

/// Separator between key segments.
const SEPARATOR: &str = ":";

/// Key segment standing in for "no option selected".
const NO_OPTION: &str = "none";

/// Errors from variant resolution.
///
/// Anything else that could go wrong here (an option that belongs to a
/// different item, a price the catalog got wrong) is a catalog defect, not a
/// user-recoverable condition, and is deliberately not modeled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// The item defines option groups but no option was selected.
    #[error("menu item {item} requires an option selection")]
    MissingRequiredOption { item: MenuItemId },
}

/// The cart-facing identity and price of one resolved variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    /// Deterministic key; equal keys mean "same line item".
    pub key: VariantKey,
    /// Option price (or base price) plus all modifier prices, floored at zero.
    pub unit_price: Money,
}

/// Resolve a selection into its identity key and unit price.
///
/// The key is `{item id}:{option id | "none"}:{modifier ids, sorted, joined}`.
/// Modifier ids are sorted so `{A, B}` and `{B, A}` resolve identically.
///
/// The unit price is the selected option's price when one is present
/// (options replace the base price, they do not add to it), otherwise the
/// item's base price, plus every selected modifier's price. A negative sum
/// is clamped to zero.
///
/// # Errors
///
/// Returns [`VariantError::MissingRequiredOption`] when the item defines
/// option groups and `selected_option` is `None`.
pub fn resolve(
    menu_item: &MenuItem,
    selected_option: Option<&MenuOption>,
    selected_modifiers: &[Modifier],
) -> Result<ResolvedVariant, VariantError> {
    if menu_item.requires_option() && selected_option.is_none() {
        return Err(VariantError::MissingRequiredOption {
            item: menu_item.id.clone(),
        });
    }

    let mut modifier_ids: Vec<&str> = selected_modifiers
        .iter()
        .map(|modifier| modifier.id.as_str())
        .collect();
    modifier_ids.sort_unstable();

    let option_segment = selected_option.map_or(NO_OPTION, |option| option.id.as_str());

    let mut segments = Vec::with_capacity(2 + modifier_ids.len());
    segments.push(menu_item.id.as_str());
    segments.push(option_segment);
    segments.extend(modifier_ids);

    let base = selected_option.map_or(menu_item.base_price, |option| option.price);
    let unit_price = selected_modifiers
        .iter()
        .fold(base, |sum, modifier| sum + modifier.price)
        .max(Money::ZERO);

    Ok(ResolvedVariant {
        key: VariantKey::new(segments.join(SEPARATOR)),
        unit_price,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use plateful_core::{ModifierGroup, OptionGroup};

    fn regular() -> MenuOption {
        MenuOption {
            id: "regular".into(),
            name: "Regular".to_string(),
            localized_name: None,
            price: Money::from_minor(1000),
        }
    }

    fn large() -> MenuOption {
        MenuOption {
            id: "large".into(),
            name: "Large".to_string(),
            localized_name: None,
            price: Money::from_minor(1200),
        }
    }

    fn item_with_option_group() -> MenuItem {
        MenuItem {
            id: "burger".into(),
            name: "Burger".to_string(),
            localized_name: None,
            base_price: Money::from_minor(1000),
            option_groups: vec![OptionGroup {
                id: "size".into(),
                name: "Size".to_string(),
                localized_name: None,
                options: vec![regular(), large()],
            }],
            modifier_groups: vec![ModifierGroup {
                id: "extras".into(),
                name: "Extras".to_string(),
                localized_name: None,
                modifiers: Vec::new(),
            }],
        }
    }

    fn simple_item() -> MenuItem {
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
            id: id.into(),
            name: id.to_string(),
            localized_name: None,
            price: Money::from_minor(minor),
        }
    }

    #[test]
    fn test_key_sorts_modifiers() {
        let item = simple_item();
        let ab = resolve(&item, None, &[modifier("bacon", 150), modifier("cheese", 200)]).unwrap();
        let ba = resolve(&item, None, &[modifier("cheese", 200), modifier("bacon", 150)]).unwrap();
        assert_eq!(ab.key, ba.key);
        assert_eq!(ab.key.as_str(), "fries:none:bacon:cheese");
    }

    #[test]
    fn test_option_replaces_base_price() {
        let item = item_with_option_group();

        let resolved = resolve(
            &item,
            Some(&large()),
            &[modifier("bacon", 150), modifier("cheese", 200)],
        )
        .unwrap();

        // 12.00 option + 1.50 + 2.00 modifiers, base price unused
        assert_eq!(resolved.unit_price, Money::from_minor(1550));
        assert_eq!(resolved.key.as_str(), "burger:large:bacon:cheese");
    }

    #[test]
    fn test_base_price_when_no_option_groups() {
        let item = simple_item();
        let resolved = resolve(&item, None, &[]).unwrap();
        assert_eq!(resolved.unit_price, Money::from_minor(450));
        assert_eq!(resolved.key.as_str(), "fries:none");
    }

    #[test]
    fn test_missing_required_option() {
        let item = item_with_option_group();
        let err = resolve(&item, None, &[]).unwrap_err();
        assert_eq!(
            err,
            VariantError::MissingRequiredOption {
                item: "burger".into()
            }
        );
    }

    #[test]
    fn test_negative_sum_clamps_to_zero() {
        let item = simple_item();
        let resolved = resolve(&item, None, &[modifier("voucher", -600)]).unwrap();
        assert_eq!(resolved.unit_price, Money::ZERO);
    }

    #[test]
    fn test_distinct_selections_distinct_keys() {
        let item = item_with_option_group();

        let a = resolve(&item, Some(&regular()), &[]).unwrap();
        let b = resolve(&item, Some(&large()), &[]).unwrap();
        assert_ne!(a.key, b.key);
    }
}
