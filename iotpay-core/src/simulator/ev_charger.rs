use rand::Rng;
use serde::Serialize;

use super::{jitter, round_to, Simulate, TICK_SECS};

/// Nominal charging power redrawn each tick.
const CHARGE_POWER_KW: f64 = 18.0;
const POWER_JITTER_KW: f64 = 0.5;
/// Battery gain per charging tick, in percent.
const BATTERY_STEP: f64 = 0.1;

/// Operating mode of the charger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargerMode {
    Available,
    Charging,
    Complete,
}

impl ChargerMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ChargerMode::Available => "AVAILABLE",
            ChargerMode::Charging => "CHARGING",
            ChargerMode::Complete => "COMPLETE",
        }
    }
}

/// Simulated EV charging station.
#[derive(Debug, Clone)]
pub struct EvCharger {
    max_power_kw: f64,
    connector_type: &'static str,
    mode: ChargerMode,
    vehicle_connected: bool,
    current_power_kw: f64,
    session_kwh: f64,
    battery_percent: f64,
    eta_min: u32,
}

impl Default for EvCharger {
    fn default() -> Self {
        Self {
            max_power_kw: 22.0,
            connector_type: "Type 2 (Mennekes)",
            mode: ChargerMode::Charging,
            vehicle_connected: true,
            current_power_kw: 11.5,
            session_kwh: 45.2,
            battery_percent: 78.0,
            eta_min: 45,
        }
    }
}

impl EvCharger {
    #[must_use]
    pub fn mode(&self) -> ChargerMode {
        self.mode
    }

    #[must_use]
    pub fn battery_percent(&self) -> f64 {
        self.battery_percent
    }

    #[must_use]
    pub fn current_power_kw(&self) -> f64 {
        self.current_power_kw
    }

    #[must_use]
    pub fn session_kwh(&self) -> f64 {
        self.session_kwh
    }

    #[must_use]
    pub fn eta_min(&self) -> u32 {
        self.eta_min
    }

    /// Begin (or continue) a charging session with a vehicle attached.
    pub fn start_charging(&mut self) {
        self.mode = ChargerMode::Charging;
        self.vehicle_connected = true;
        self.current_power_kw = CHARGE_POWER_KW.min(self.max_power_kw);
        self.eta_min = remaining_minutes(self.battery_percent);
    }

    /// End the session. Returns `false` if the charger was not charging.
    pub fn stop(&mut self) -> bool {
        if self.mode != ChargerMode::Charging {
            return false;
        }
        self.mode = ChargerMode::Complete;
        self.current_power_kw = 0.0;
        self.eta_min = 0;
        true
    }
}

impl Simulate for EvCharger {
    type Telemetry = EvTelemetry;

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.mode != ChargerMode::Charging {
            return;
        }
        self.current_power_kw =
            (CHARGE_POWER_KW + jitter(rng, POWER_JITTER_KW)).clamp(0.0, self.max_power_kw);
        self.session_kwh += self.current_power_kw * f64::from(TICK_SECS) / 3600.0;
        self.battery_percent = (self.battery_percent + BATTERY_STEP).min(100.0);

        if self.battery_percent >= 100.0 {
            self.mode = ChargerMode::Complete;
            self.current_power_kw = 0.0;
            self.eta_min = 0;
        } else {
            self.eta_min = remaining_minutes(self.battery_percent);
        }
    }

    fn snapshot(&self) -> EvTelemetry {
        EvTelemetry {
            status: self.mode,
            vehicle_connected: self.vehicle_connected,
            current_power_kw: round_to(self.current_power_kw, 2),
            session_kwh: round_to(self.session_kwh, 2),
            max_power_kw: self.max_power_kw,
            connector_type: self.connector_type,
            estimated_time_remaining_min: self.eta_min,
            battery_simulation: BatterySimulation {
                percent: whole_percent(self.battery_percent),
            },
        }
    }

    fn status_label(&self) -> &'static str {
        self.mode.as_str()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn remaining_minutes(battery_percent: f64) -> u32 {
    let ticks = ((100.0 - battery_percent).max(0.0) / BATTERY_STEP).ceil();
    (ticks * f64::from(TICK_SECS) / 60.0).ceil() as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_percent(battery_percent: f64) -> u8 {
    battery_percent.clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Serialize)]
pub struct EvTelemetry {
    pub status: ChargerMode,
    pub vehicle_connected: bool,
    pub current_power_kw: f64,
    pub session_kwh: f64,
    pub max_power_kw: f64,
    pub connector_type: &'static str,
    pub estimated_time_remaining_min: u32,
    pub battery_simulation: BatterySimulation,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatterySimulation {
    pub percent: u8,
}
