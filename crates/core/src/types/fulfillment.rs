//! Fulfillment method/mode selections and bookable schedule slots.

use chrono::{DateTime, Local, NaiveTime};
use serde::{Deserialize, Serialize};

/// How the order leaves the restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentMethod {
    #[default]
    Pickup,
    Delivery,
}

impl FulfillmentMethod {
    /// Wire representation, also used as the availability query `mode`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }
}

impl std::fmt::Display for FulfillmentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FulfillmentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(Self::Pickup),
            "delivery" => Ok(Self::Delivery),
            _ => Err(format!("invalid fulfillment method: {s}")),
        }
    }
}

/// When the order should be prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentMode {
    /// As soon as possible.
    #[default]
    Immediate,
    /// At a confirmed future slot.
    Scheduled,
}

/// The customer's complete fulfillment choice for one checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentSelection {
    /// Pickup or delivery.
    pub method: FulfillmentMethod,
    /// Immediate or scheduled.
    pub mode: FulfillmentMode,
    /// Absolute local start time; present exactly when `mode` is
    /// [`FulfillmentMode::Scheduled`] and a slot has been confirmed.
    pub scheduled_time: Option<DateTime<Local>>,
    /// Delivery address, when `method` is [`FulfillmentMethod::Delivery`].
    pub address: Option<String>,
}

impl FulfillmentSelection {
    /// An as-soon-as-possible selection.
    #[must_use]
    pub const fn immediate(method: FulfillmentMethod) -> Self {
        Self {
            method,
            mode: FulfillmentMode::Immediate,
            scheduled_time: None,
            address: None,
        }
    }

    /// A selection scheduled for a confirmed slot time.
    #[must_use]
    pub const fn scheduled(method: FulfillmentMethod, at: DateTime<Local>) -> Self {
        Self {
            method,
            mode: FulfillmentMode::Scheduled,
            scheduled_time: Some(at),
            address: None,
        }
    }

    /// Attach a delivery address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// A bookable start time for one calendar day, as returned by the
/// availability service.
///
/// The service reports times of day; the absolute timestamp only exists once
/// the scheduling engine composes a slot with its day at confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Slot start, local time of day.
    pub start: NaiveTime,
}

impl ScheduleSlot {
    /// Create a slot starting at the given local time of day.
    #[must_use]
    pub const fn new(start: NaiveTime) -> Self {
        Self { start }
    }

    /// Display label in the service's own `h:mm AM/PM` shape, e.g. `1:30 PM`.
    #[must_use]
    pub fn label(&self) -> String {
        self.start.format("%-I:%M %p").to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_method_wire_strings() {
        assert_eq!(FulfillmentMethod::Pickup.as_str(), "pickup");
        assert_eq!(FulfillmentMethod::Delivery.as_str(), "delivery");
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("pickup".parse::<FulfillmentMethod>(), Ok(FulfillmentMethod::Pickup));
        assert_eq!("delivery".parse::<FulfillmentMethod>(), Ok(FulfillmentMethod::Delivery));
        assert!("drone".parse::<FulfillmentMethod>().is_err());
    }

    #[test]
    fn test_slot_label_is_twelve_hour() {
        let slot = ScheduleSlot::new(NaiveTime::from_hms_opt(13, 30, 0).unwrap());
        assert_eq!(slot.label(), "1:30 PM");

        let morning = ScheduleSlot::new(NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(morning.label(), "9:05 AM");
    }

    #[test]
    fn test_scheduled_selection_carries_time() {
        let at = Local::now();
        let selection = FulfillmentSelection::scheduled(FulfillmentMethod::Delivery, at)
            .with_address("12 Elm St");
        assert_eq!(selection.mode, FulfillmentMode::Scheduled);
        assert_eq!(selection.scheduled_time, Some(at));
        assert_eq!(selection.address.as_deref(), Some("12 Elm St"));
    }
}
