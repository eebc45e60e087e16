use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::simulator::{DeviceState, Simulate, Telemetry};

/// The fixed set of simulated device kinds.
///
/// A device's type is determined by its [`DeviceState`] variant and never
/// changes after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    #[serde(rename = "ev_charger")]
    EvCharger,
    #[serde(rename = "3d_printer")]
    Printer3d,
    #[serde(rename = "smart_lock")]
    SmartLock,
    #[serde(rename = "vending_machine")]
    VendingMachine,
    #[serde(rename = "security_camera")]
    SecurityCamera,
}

impl DeviceType {
    /// Every device type, in fleet order.
    pub const ALL: [DeviceType; 5] = [
        DeviceType::EvCharger,
        DeviceType::Printer3d,
        DeviceType::SmartLock,
        DeviceType::VendingMachine,
        DeviceType::SecurityCamera,
    ];

    /// Wire name of the type, e.g. `"3d_printer"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DeviceType::EvCharger => "ev_charger",
            DeviceType::Printer3d => "3d_printer",
            DeviceType::SmartLock => "smart_lock",
            DeviceType::VendingMachine => "vending_machine",
            DeviceType::SecurityCamera => "security_camera",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable identity of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DeviceInfo {
    /// Unique hyphenated id, e.g. `"smart-lock-01"`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Symbolic domain, e.g. `"smartlock.eth"`.
    pub ens_domain: String,
}

impl DeviceInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        ens_domain: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ens_domain: ens_domain.into(),
        }
    }
}

/// A simulated device: identity plus exactly one type-specific state.
#[derive(Debug, Clone)]
pub struct Device {
    info: DeviceInfo,
    state: DeviceState,
    last_updated: DateTime<Utc>,
}

impl Device {
    #[must_use]
    pub fn new(info: DeviceInfo, state: DeviceState) -> Self {
        Self {
            info,
            state,
            last_updated: Utc::now(),
        }
    }

    #[must_use]
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.info.id
    }

    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.state.device_type()
    }

    #[must_use]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Mutable access to the simulator state, used by the action executor.
    pub fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Advance the simulator by one tick and refresh `last_updated`.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.state.advance(rng);
        self.touch();
    }

    /// Refresh `last_updated` without stepping the simulation.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    #[must_use]
    pub fn status_label(&self) -> &'static str {
        self.state.status_label()
    }

    /// Row for the `/status` listing.
    #[must_use]
    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            id: self.info.id.clone(),
            name: self.info.name.clone(),
            device_type: self.device_type(),
            status: self.status_label(),
            ens: self.info.ens_domain.clone(),
            ens_domain: self.info.ens_domain.clone(),
        }
    }

    /// Full telemetry view for `/status/{id}`.
    #[must_use]
    pub fn detail(&self) -> DeviceDetail {
        DeviceDetail {
            id: self.info.id.clone(),
            name: self.info.name.clone(),
            device_type: self.device_type(),
            ens_domain: self.info.ens_domain.clone(),
            last_updated: self.last_updated.to_rfc3339_opts(SecondsFormat::Micros, true),
            payment_config: DevicePaymentConfig::for_type(self.device_type()),
            telemetry: self.state.snapshot(),
        }
    }
}

/// Summary row returned by `GET /status`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub status: &'static str,
    pub ens: String,
    pub ens_domain: String,
}

/// Detail document returned by `GET /status/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceDetail {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub ens_domain: String,
    /// ISO-8601 UTC with a trailing `Z`.
    pub last_updated: String,
    pub payment_config: Option<DevicePaymentConfig>,
    pub telemetry: Telemetry,
}

/// Usage-based pricing hint advertised by metered devices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevicePaymentConfig {
    pub price_per_min: f64,
    pub currency: &'static str,
}

impl DevicePaymentConfig {
    /// Only the 3D printer advertises a per-minute rate.
    #[must_use]
    pub fn for_type(device_type: DeviceType) -> Option<Self> {
        match device_type {
            DeviceType::Printer3d => Some(Self {
                price_per_min: 0.10,
                currency: "USDC",
            }),
            _ => None,
        }
    }
}
