//! Per-type telemetry simulators.
//!
//! Each device type owns its own mutable state and steps it one discrete
//! tick at a time. Simulators never fail: every quantity is clamped to its
//! valid range.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::device::DeviceType;

pub mod camera;
pub mod ev_charger;
pub mod printer;
pub mod smart_lock;
pub mod vending;

pub use camera::{CameraTelemetry, SecurityCamera};
pub use ev_charger::{ChargerMode, EvCharger, EvTelemetry};
pub use printer::{Printer3d, PrinterMode, PrinterTelemetry};
pub use smart_lock::{LockTelemetry, SmartLock};
pub use vending::{VendingMachine, VendingTelemetry};

/// Wall-clock time represented by one tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// [`TICK_INTERVAL`] in seconds.
pub const TICK_SECS: u32 = 5;

/// Shared capability of every simulator.
pub trait Simulate {
    /// Read-only telemetry produced by [`Simulate::snapshot`].
    type Telemetry: Serialize;

    /// Mutate the state by exactly one tick.
    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// Current telemetry.
    fn snapshot(&self) -> Self::Telemetry;

    /// Short status label drawn from the type's fixed enumeration.
    fn status_label(&self) -> &'static str;
}

/// Type-specific simulator state; one variant per [`DeviceType`].
#[derive(Debug, Clone)]
pub enum DeviceState {
    EvCharger(EvCharger),
    Printer(Printer3d),
    SmartLock(SmartLock),
    Vending(VendingMachine),
    Camera(SecurityCamera),
}

impl DeviceState {
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        match self {
            DeviceState::EvCharger(_) => DeviceType::EvCharger,
            DeviceState::Printer(_) => DeviceType::Printer3d,
            DeviceState::SmartLock(_) => DeviceType::SmartLock,
            DeviceState::Vending(_) => DeviceType::VendingMachine,
            DeviceState::Camera(_) => DeviceType::SecurityCamera,
        }
    }
}

impl Simulate for DeviceState {
    type Telemetry = Telemetry;

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self {
            DeviceState::EvCharger(s) => s.advance(rng),
            DeviceState::Printer(s) => s.advance(rng),
            DeviceState::SmartLock(s) => s.advance(rng),
            DeviceState::Vending(s) => s.advance(rng),
            DeviceState::Camera(s) => s.advance(rng),
        }
    }

    fn snapshot(&self) -> Telemetry {
        match self {
            DeviceState::EvCharger(s) => Telemetry::EvCharger(s.snapshot()),
            DeviceState::Printer(s) => Telemetry::Printer(s.snapshot()),
            DeviceState::SmartLock(s) => Telemetry::SmartLock(s.snapshot()),
            DeviceState::Vending(s) => Telemetry::Vending(s.snapshot()),
            DeviceState::Camera(s) => Telemetry::Camera(s.snapshot()),
        }
    }

    fn status_label(&self) -> &'static str {
        match self {
            DeviceState::EvCharger(s) => s.status_label(),
            DeviceState::Printer(s) => s.status_label(),
            DeviceState::SmartLock(s) => s.status_label(),
            DeviceState::Vending(s) => s.status_label(),
            DeviceState::Camera(s) => s.status_label(),
        }
    }
}

/// Telemetry document; serialized without a tag, as a flat object.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Telemetry {
    EvCharger(EvTelemetry),
    Printer(PrinterTelemetry),
    SmartLock(LockTelemetry),
    Vending(VendingTelemetry),
    Camera(CameraTelemetry),
}

/// Round to a fixed number of decimal places for display.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Symmetric jitter in `[-amplitude, amplitude]`.
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f64) -> f64 {
    rng.gen_range(-amplitude..=amplitude)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::fleet::default_fleet;

    const LABELS: &[(DeviceType, &[&str])] = &[
        (DeviceType::EvCharger, &["AVAILABLE", "CHARGING", "COMPLETE"]),
        (DeviceType::Printer3d, &["IDLE", "PRINTING", "PAUSED", "COOLING"]),
        (DeviceType::SmartLock, &["LOCKED", "UNLOCKED"]),
        (DeviceType::VendingMachine, &["OK", "JAMMED"]),
        (DeviceType::SecurityCamera, &["STREAMING", "PRIVACY"]),
    ];

    fn allowed(ty: DeviceType) -> &'static [&'static str] {
        LABELS
            .iter()
            .find(|(t, _)| *t == ty)
            .map(|(_, labels)| *labels)
            .unwrap_or_default()
    }

    #[test]
    fn status_labels_stay_within_enumeration_over_many_ticks() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut fleet = default_fleet();
        for _ in 0..500 {
            for device in &mut fleet {
                device.advance(&mut rng);
                let label = device.status_label();
                assert!(!label.is_empty());
                assert!(
                    allowed(device.device_type()).contains(&label),
                    "{label} is not a valid label for {}",
                    device.device_type()
                );
            }
        }
    }

    #[test]
    fn round_to_truncates_noise() {
        assert!((round_to(18.456, 2) - 18.46).abs() < f64::EPSILON);
        assert!((round_to(4.249, 1) - 4.2).abs() < f64::EPSILON);
    }

    #[test]
    fn telemetry_serializes_flat() {
        let fleet = default_fleet();
        let json = match serde_json::to_value(fleet[2].state().snapshot()) {
            Ok(v) => v,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(json["is_locked"], true);
    }
}
