//! Core types for the iotpay simulated device fleet.
//!
//! Defines the device model, the per-type telemetry simulators, the device
//! registry, the pricing table and the capability descriptors that the
//! payment gate and the action executor agree on.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod capability;
pub mod device;
pub mod error;
pub mod fleet;
pub mod pricing;
pub mod proof;
pub mod registry;
pub mod simulator;

pub use capability::{device_capabilities, Capability, HttpMethod};
pub use device::{Device, DeviceDetail, DeviceInfo, DevicePaymentConfig, DeviceSummary, DeviceType};
pub use error::CoreError;
pub use fleet::default_fleet;
pub use pricing::{price_for, requires_payment, Price};
pub use proof::PaymentProof;
pub use registry::{alias_from_id, id_from_alias, normalize_domain, DeviceKey, DeviceRegistry};
pub use simulator::{DeviceState, Simulate, Telemetry, TICK_INTERVAL, TICK_SECS};
