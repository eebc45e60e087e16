//! The fixed fleet of simulated devices.
//!
//! Five devices, one per [`DeviceType`](crate::DeviceType), created with
//! hard-coded initial state at process start.

use crate::device::{Device, DeviceInfo};
use crate::simulator::{
    DeviceState, EvCharger, Printer3d, SecurityCamera, SmartLock, VendingMachine,
};

/// Returns the five canonical devices in tick order.
#[must_use]
pub fn default_fleet() -> Vec<Device> {
    vec![
        Device::new(
            DeviceInfo::new("ev-station-01", "Tesla Supercharger - Centro", "evcharger.eth"),
            DeviceState::EvCharger(EvCharger::default()),
        ),
        Device::new(
            DeviceInfo::new("printer-3d-01", "Prusa Lab", "3dprinter.eth"),
            DeviceState::Printer(Printer3d::default()),
        ),
        Device::new(
            DeviceInfo::new("smart-lock-01", "Puerta Principal - Sala 402", "smartlock.eth"),
            DeviceState::SmartLock(SmartLock::default()),
        ),
        Device::new(
            DeviceInfo::new("vending-machine-01", "Dispensador Hall", "vendingmachine.eth"),
            DeviceState::Vending(VendingMachine::default()),
        ),
        Device::new(
            DeviceInfo::new("camera-01", "Cámara Pasillo", "camera.eth"),
            DeviceState::Camera(SecurityCamera::default()),
        ),
    ]
}
