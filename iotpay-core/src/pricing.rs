//! Static price table for device actions.
//!
//! Prices are held as exact micro-units of the native token and rendered as
//! the shortest decimal string (`1_000` → `"0.001"`). An action absent from
//! the table falls back to its device type's default price; a price of zero
//! means the action is free.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::device::DeviceType;

const MICROS_PER_TOKEN: u64 = 1_000_000;

/// An amount of native token, in millionths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u64);

impl Price {
    pub const FREE: Price = Price(0);

    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    #[must_use]
    pub const fn micros(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_free(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / MICROS_PER_TOKEN;
        let frac = self.0 % MICROS_PER_TOKEN;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:06}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const fn micros(value: u64) -> Price {
    Price::from_micros(value)
}

/// `(device type, action, price)`; actions listed here are the ones each
/// device advertises.
pub const PRICE_TABLE: &[(DeviceType, &str, Price)] = &[
    (DeviceType::EvCharger, "charge", micros(2_000)),
    (DeviceType::EvCharger, "stop", Price::FREE),
    (DeviceType::Printer3d, "print", micros(1_000)),
    (DeviceType::Printer3d, "buy_filament", micros(5_000)),
    (DeviceType::Printer3d, "pause", Price::FREE),
    (DeviceType::Printer3d, "resume", Price::FREE),
    (DeviceType::Printer3d, "cancel", Price::FREE),
    (DeviceType::SmartLock, "unlock", micros(1_000)),
    (DeviceType::SmartLock, "lock", Price::FREE),
    (DeviceType::VendingMachine, "dispense", micros(500)),
    (DeviceType::VendingMachine, "restock", Price::FREE),
    (DeviceType::SecurityCamera, "view_stream", micros(1_000)),
    (DeviceType::SecurityCamera, "snapshot", micros(500)),
];

/// Price charged for actions not listed in [`PRICE_TABLE`].
#[must_use]
pub const fn default_price(device_type: DeviceType) -> Price {
    match device_type {
        DeviceType::EvCharger => micros(2_000),
        DeviceType::Printer3d | DeviceType::SmartLock | DeviceType::SecurityCamera => {
            micros(1_000)
        }
        DeviceType::VendingMachine => micros(500),
    }
}

#[must_use]
pub fn price_for(device_type: DeviceType, action: &str) -> Price {
    PRICE_TABLE
        .iter()
        .find(|(ty, id, _)| *ty == device_type && *id == action)
        .map_or_else(|| default_price(device_type), |(_, _, price)| *price)
}

#[must_use]
pub fn requires_payment(device_type: DeviceType, action: &str) -> bool {
    !price_for(device_type, action).is_free()
}

/// Actions the table lists for a device type, in table order.
pub fn listed_actions(device_type: DeviceType) -> impl Iterator<Item = (&'static str, Price)> {
    PRICE_TABLE
        .iter()
        .filter(move |(ty, _, _)| *ty == device_type)
        .map(|(_, id, price)| (*id, *price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_display_is_minimal_decimal() {
        assert_eq!(Price::from_micros(1_000).to_string(), "0.001");
        assert_eq!(Price::from_micros(500).to_string(), "0.0005");
        assert_eq!(Price::from_micros(2_500_000).to_string(), "2.5");
        assert_eq!(Price::from_micros(3_000_000).to_string(), "3");
        assert_eq!(Price::FREE.to_string(), "0");
    }

    #[test]
    fn price_serializes_as_string() {
        let json = match serde_json::to_string(&Price::from_micros(1_000)) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(json, "\"0.001\"");
    }

    #[test]
    fn unlock_costs_a_thousandth() {
        assert_eq!(price_for(DeviceType::SmartLock, "unlock").to_string(), "0.001");
        assert!(requires_payment(DeviceType::SmartLock, "unlock"));
        assert!(!requires_payment(DeviceType::SmartLock, "lock"));
    }

    #[test]
    fn unknown_actions_fall_back_to_type_default() {
        for ty in DeviceType::ALL {
            assert_eq!(price_for(ty, "self_destruct"), default_price(ty));
            assert!(requires_payment(ty, "self_destruct"), "defaults are never free");
        }
    }

    #[test]
    fn every_type_lists_at_least_one_paid_action() {
        for ty in DeviceType::ALL {
            assert!(listed_actions(ty).any(|(_, price)| !price.is_free()), "{ty}");
        }
    }

    proptest::proptest! {
        #[test]
        fn proptest_price_display_parses_back(micros in 0u64..10_000_000_000) {
            let rendered = Price::from_micros(micros).to_string();
            let (whole, frac) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
            proptest::prop_assert!(!frac.ends_with('0'));
            let whole: u64 = whole
                .parse()
                .map_err(|e| proptest::test_runner::TestCaseError::fail(format!("{e}")))?;
            let frac_micros: u64 = if frac.is_empty() {
                0
            } else {
                format!("{frac:0<6}")
                    .parse()
                    .map_err(|e| proptest::test_runner::TestCaseError::fail(format!("{e}")))?
            };
            proptest::prop_assert_eq!(whole * 1_000_000 + frac_micros, micros);
        }
    }
}
