//! Machine-readable capability descriptors.
//!
//! Derived on every query from a device's type, the price table and the
//! device's current mode, so the manifest always agrees with what the
//! payment gate will charge.

use serde::Serialize;

use crate::device::{Device, DeviceType};
use crate::pricing::{listed_actions, Price};
use crate::registry::alias_from_id;
use crate::simulator::{ChargerMode, DeviceState, PrinterMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

/// One action a client may invoke.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capability {
    pub id: String,
    pub endpoint: String,
    pub method: HttpMethod,
    pub description: String,
    pub payment_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_amount_eth: Option<Price>,
    #[serde(skip_serializing_if = "no_params")]
    pub params: &'static [&'static str],
}

impl Capability {
    /// A free, parameterless capability.
    pub fn free(
        id: impl Into<String>,
        method: HttpMethod,
        endpoint: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            method,
            description: description.into(),
            payment_required: false,
            default_amount_eth: None,
            params: &[],
        }
    }

    /// A job action posted to the device's `/job` endpoint.
    #[must_use]
    pub fn job(
        alias: &str,
        action: &str,
        price: Price,
        description: &str,
        params: &'static [&'static str],
    ) -> Self {
        Self {
            id: action.to_owned(),
            endpoint: format!("/devices/{alias}/job"),
            method: HttpMethod::Post,
            description: description.to_owned(),
            payment_required: !price.is_free(),
            default_amount_eth: (!price.is_free()).then_some(price),
            params,
        }
    }
}

fn no_params(params: &&'static [&'static str]) -> bool {
    params.is_empty()
}

/// Capabilities a device currently exposes.
#[must_use]
pub fn device_capabilities(device: &Device) -> Vec<Capability> {
    let alias = alias_from_id(device.id());
    let device_type = device.device_type();

    let mut capabilities = vec![Capability::free(
        "status",
        HttpMethod::Get,
        format!("/devices/{alias}/status"),
        format!("Read live telemetry from {}", device.info().name),
    )];

    capabilities.extend(
        listed_actions(device_type)
            .filter(|(action, _)| offered_in_mode(device.state(), action))
            .map(|(action, price)| {
                let (description, params) = action_help(device_type, action);
                Capability::job(&alias, action, price, description, params)
            }),
    );
    capabilities
}

fn offered_in_mode(state: &DeviceState, action: &str) -> bool {
    match state {
        DeviceState::EvCharger(charger) => match action {
            "charge" => charger.mode() != ChargerMode::Charging,
            "stop" => charger.mode() == ChargerMode::Charging,
            _ => true,
        },
        DeviceState::Printer(printer) => match action {
            "print" => printer.mode() != PrinterMode::Printing,
            "pause" => printer.mode() == PrinterMode::Printing,
            "resume" => printer.mode() == PrinterMode::Paused,
            "cancel" => matches!(printer.mode(), PrinterMode::Printing | PrinterMode::Paused),
            _ => true,
        },
        DeviceState::SmartLock(lock) => match action {
            "unlock" => lock.is_locked(),
            "lock" => !lock.is_locked(),
            _ => true,
        },
        DeviceState::Vending(_) | DeviceState::Camera(_) => true,
    }
}

fn action_help(device_type: DeviceType, action: &str) -> (&'static str, &'static [&'static str]) {
    match (device_type, action) {
        (DeviceType::EvCharger, "charge") => ("Start a charging session", &["target_percent"]),
        (DeviceType::EvCharger, "stop") => ("Stop the current charging session", &[]),
        (DeviceType::Printer3d, "print") => ("Start a print job", &["file_name"]),
        (DeviceType::Printer3d, "buy_filament") => {
            ("Buy a filament spool", &["material", "color", "weight_g"])
        }
        (DeviceType::Printer3d, "pause") => ("Pause the running print job", &[]),
        (DeviceType::Printer3d, "resume") => ("Resume a paused print job", &[]),
        (DeviceType::Printer3d, "cancel") => ("Cancel the current print job", &[]),
        (DeviceType::SmartLock, "unlock") => ("Unlock the door; it re-locks after 300s", &[]),
        (DeviceType::SmartLock, "lock") => ("Lock the door immediately", &[]),
        (DeviceType::VendingMachine, "dispense") => ("Dispense one product", &["slot", "product"]),
        (DeviceType::VendingMachine, "restock") => {
            ("Restock a slot", &["slot", "product", "quantity"])
        }
        (DeviceType::SecurityCamera, "view_stream") => ("Open the live video stream", &[]),
        (DeviceType::SecurityCamera, "snapshot") => ("Capture a still frame", &[]),
        _ => ("Device action", &[]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::default_fleet;
    use crate::pricing::price_for;

    fn ids(caps: &[Capability]) -> Vec<&str> {
        caps.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn capabilities_agree_with_price_table() {
        for device in default_fleet() {
            for cap in device_capabilities(&device).iter().skip(1) {
                let price = price_for(device.device_type(), &cap.id);
                assert_eq!(cap.payment_required, !price.is_free(), "{}", cap.id);
                assert_eq!(cap.default_amount_eth, (!price.is_free()).then_some(price));
            }
        }
    }

    #[test]
    fn printing_printer_offers_pause_not_resume() {
        let fleet = default_fleet();
        let caps = device_capabilities(&fleet[1]);
        let ids = ids(&caps);
        assert!(ids.contains(&"pause"));
        assert!(ids.contains(&"cancel"));
        assert!(!ids.contains(&"resume"));
        assert!(!ids.contains(&"print"));
    }

    #[test]
    fn idle_printer_offers_print_only() {
        let mut fleet = default_fleet();
        if let DeviceState::Printer(printer) = fleet[1].state_mut() {
            printer.cancel();
        }
        let caps = device_capabilities(&fleet[1]);
        assert_eq!(ids(&caps), ["status", "print", "buy_filament"]);
    }

    #[test]
    fn job_endpoints_use_alias() {
        let fleet = default_fleet();
        let caps = device_capabilities(&fleet[2]);
        assert_eq!(caps[0].endpoint, "/devices/smart_lock_01/status");
        let unlock = caps.iter().find(|c| c.id == "unlock");
        match unlock {
            Some(c) => {
                assert_eq!(c.endpoint, "/devices/smart_lock_01/job");
                assert_eq!(c.method, HttpMethod::Post);
            }
            None => panic!("locked door must offer unlock"),
        }
    }

    #[test]
    fn free_capability_omits_amount_in_json() {
        let cap = Capability::free("status", HttpMethod::Get, "/status", "list");
        let json = match serde_json::to_value(&cap) {
            Ok(v) => v,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(json["method"], "GET");
        assert!(json.get("default_amount_eth").is_none());
        assert!(json.get("params").is_none());
    }
}
