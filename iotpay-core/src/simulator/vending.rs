use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::{jitter, round_to, Simulate};

const TEMP_SETPOINT_C: f64 = 4.2;
/// Chance per tick that a walk-up customer buys something.
const SPONTANEOUS_PURCHASE_P: f64 = 0.01;

/// Simulated refrigerated vending machine.
#[derive(Debug, Clone)]
pub struct VendingMachine {
    stock_level: IndexMap<String, u32>,
    temperature_internal: f64,
    last_dispensed: String,
    is_jammed: bool,
}

impl Default for VendingMachine {
    fn default() -> Self {
        let stock_level = [("A1", 5), ("A2", 2), ("B1", 8), ("B2", 1), ("C1", 10), ("C2", 4)]
            .into_iter()
            .map(|(slot, qty)| (slot.to_owned(), qty))
            .collect();
        Self {
            stock_level,
            temperature_internal: TEMP_SETPOINT_C,
            last_dispensed: now_iso(),
            is_jammed: false,
        }
    }
}

impl VendingMachine {
    #[must_use]
    pub fn stock(&self, slot: &str) -> Option<u32> {
        self.stock_level.get(slot).copied()
    }

    #[must_use]
    pub fn total_stock(&self) -> u32 {
        self.stock_level.values().sum()
    }

    /// Product stocked in a slot; rows map to a fixed catalog.
    #[must_use]
    pub fn product_for_slot(slot: &str) -> &'static str {
        match slot.chars().next() {
            Some('A' | 'a') => "Coke",
            Some('B' | 'b') => "Water",
            _ => "Snack",
        }
    }

    /// Hand out one item. Returns the remaining stock, or `None` if the
    /// slot is unknown or empty.
    pub fn dispense(&mut self, slot: &str) -> Option<u32> {
        let level = self.stock_level.get_mut(slot)?;
        if *level == 0 {
            return None;
        }
        *level -= 1;
        let remaining = *level;
        self.last_dispensed = now_iso();
        Some(remaining)
    }

    /// Add `quantity` items to an existing slot. Returns the new level, or
    /// `None` if the slot is not part of the machine's layout.
    pub fn restock(&mut self, slot: &str, quantity: u32) -> Option<u32> {
        let level = self.stock_level.get_mut(slot)?;
        *level = level.saturating_add(quantity);
        Some(*level)
    }
}

impl Simulate for VendingMachine {
    type Telemetry = VendingTelemetry;

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.temperature_internal = TEMP_SETPOINT_C + jitter(rng, 0.3);

        if rng.gen_bool(SPONTANEOUS_PURCHASE_P) {
            let stocked: Vec<String> = self
                .stock_level
                .iter()
                .filter(|(_, qty)| **qty > 0)
                .map(|(slot, _)| slot.clone())
                .collect();
            if let Some(slot) = stocked.choose(rng) {
                self.dispense(slot);
            }
        }
    }

    fn snapshot(&self) -> VendingTelemetry {
        VendingTelemetry {
            stock_level: self.stock_level.clone(),
            temperature_internal: round_to(self.temperature_internal, 1),
            last_dispensed: self.last_dispensed.clone(),
            is_jammed: self.is_jammed,
        }
    }

    fn status_label(&self) -> &'static str {
        if self.is_jammed {
            "JAMMED"
        } else {
            "OK"
        }
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Serialize)]
pub struct VendingTelemetry {
    pub stock_level: IndexMap<String, u32>,
    pub temperature_internal: f64,
    pub last_dispensed: String,
    pub is_jammed: bool,
}
