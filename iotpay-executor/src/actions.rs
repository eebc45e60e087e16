//! Action executor.
//!
//! Applies an action the payment gate has already admitted. Dispatch is an
//! exhaustive match on the device's state variant; within a variant, unknown
//! action ids fall through to a generic result that changes nothing.
//! "Not applicable in the current mode" is a successful no-op with
//! `applied == false`, never an error.

use chrono::Utc;
use iotpay_core::simulator::{EvCharger, Printer3d, PrinterMode, SmartLock, VendingMachine};
use iotpay_core::{Device, DeviceDetail, DeviceState};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::receipt::{derive_proof_token, new_record_id};

const DEFAULT_PRINT_FILE: &str = "model.gcode";
const DEFAULT_SLOT: &str = "A1";
const DEFAULT_RESTOCK_QTY: u32 = 10;

/// An admitted action and its free-form parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionRequest {
    pub action: String,
    pub params: Map<String, Value>,
    /// Proof echoed back to the caller, or the free-action sentinel.
    pub proof: String,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>, proof: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Map::new(),
            proof: proof.into(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Accepts both JSON numbers and numeric strings.
    fn u32_param(&self, key: &str) -> Option<u32> {
        match self.params.get(key)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Response body for an executed action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub success: bool,
    /// `false` when the action was admitted but had nothing to do.
    pub applied: bool,
    pub message: String,
    pub transaction_hash: String,
    pub device_status: DeviceDetail,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

struct Outcome {
    applied: bool,
    message: String,
    extra: Map<String, Value>,
}

impl Outcome {
    fn applied(message: impl Into<String>) -> Self {
        Self {
            applied: true,
            message: message.into(),
            extra: Map::new(),
        }
    }

    fn noop(message: impl Into<String>) -> Self {
        Self {
            applied: false,
            message: message.into(),
            extra: Map::new(),
        }
    }

    fn generic(action: &str, name: &str) -> Self {
        Self::noop(format!("Action '{action}' accepted by {name}"))
    }

    fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_owned(), value.into());
        self
    }
}

/// Apply `request` to `device` and report the resulting state.
///
/// Refreshes `last_updated` without stepping the simulation, so values set
/// by the action (such as the 300 s auto-lock countdown) are reported as set.
pub fn execute(device: &mut Device, request: &ActionRequest) -> ActionResult {
    let device_id = device.id().to_owned();
    let name = device.info().name.clone();
    let action = request.action.as_str();

    let outcome = match device.state_mut() {
        DeviceState::SmartLock(lock) => smart_lock(lock, request, &name),
        DeviceState::Printer(printer) => printer_action(printer, request, &device_id, &name),
        DeviceState::EvCharger(charger) => ev_charger(charger, request, &name),
        DeviceState::Vending(machine) => vending(machine, request, &device_id, &name),
        DeviceState::Camera(_) => Outcome::generic(action, &name),
    };
    device.touch();

    ActionResult {
        success: true,
        applied: outcome.applied,
        message: outcome.message,
        transaction_hash: request.proof.clone(),
        device_status: device.detail(),
        extra: outcome.extra,
    }
}

/// Shorten a proof for display, e.g. `0x1234...abcd`.
fn truncate_proof(proof: &str) -> String {
    const HEAD: usize = 6;
    const TAIL: usize = 4;
    let chars = proof.chars().count();
    if chars <= HEAD + TAIL + 3 {
        return proof.to_owned();
    }
    let head: String = proof.chars().take(HEAD).collect();
    let tail: String = proof.chars().skip(chars - TAIL).collect();
    format!("{head}...{tail}")
}

fn smart_lock(lock: &mut SmartLock, request: &ActionRequest, name: &str) -> Outcome {
    match request.action.as_str() {
        "unlock" => {
            lock.unlock(truncate_proof(&request.proof));
            Outcome::applied(format!("{name} unlocked"))
                .with("auto_lock_in_sec", lock.auto_lock_timer_sec())
        }
        "lock" => {
            lock.lock();
            Outcome::applied(format!("{name} locked"))
        }
        other => Outcome::generic(other, name),
    }
}

fn printer_action(
    printer: &mut Printer3d,
    request: &ActionRequest,
    device_id: &str,
    name: &str,
) -> Outcome {
    match request.action.as_str() {
        "print" => {
            if printer.mode() == PrinterMode::Printing {
                return Outcome::noop(format!("{name} is already printing"));
            }
            let job_id = new_record_id("job");
            let job_proof = derive_proof_token(&[&job_id, &request.proof, device_id]);
            let requested = request.str_param("file_name").unwrap_or(DEFAULT_PRINT_FILE);
            let file_name = format!("{}_{requested}", Utc::now().format("%Y%m%d_%H%M%S"));
            printer.start_job(file_name.clone());
            Outcome::applied(format!("Print job started on {name}"))
                .with("job_id", job_id)
                .with("job_proof", job_proof)
                .with("file_name", file_name)
        }
        "buy_filament" => {
            let purchase_id = new_record_id("fil");
            let purchase_proof = derive_proof_token(&[&purchase_id, &request.proof, device_id]);
            Outcome::applied("Filament purchase recorded")
                .with("purchase_id", purchase_id)
                .with("purchase_proof", purchase_proof)
                .with("material", request.str_param("material").unwrap_or(printer.material()))
                .with("color", request.str_param("color").unwrap_or("black"))
                .with("weight_g", request.u32_param("weight_g").unwrap_or(1_000))
        }
        "pause" => {
            if printer.pause() {
                Outcome::applied("Print job paused")
            } else {
                Outcome::noop(format!("{name} is not printing; nothing to pause"))
            }
        }
        "resume" => {
            if printer.resume() {
                Outcome::applied("Print job resumed")
            } else {
                Outcome::noop(format!("{name} is not paused; nothing to resume"))
            }
        }
        "cancel" => {
            if printer.cancel() {
                Outcome::applied("Print job cancelled")
            } else {
                Outcome::noop(format!("{name} has no active job to cancel"))
            }
        }
        other => Outcome::generic(other, name),
    }
}

fn ev_charger(charger: &mut EvCharger, request: &ActionRequest, name: &str) -> Outcome {
    match request.action.as_str() {
        "charge" => {
            let target = request.u32_param("target_percent").unwrap_or(100).min(100);
            charger.start_charging();
            Outcome::applied(format!("Charging started on {name}")).with("target_percent", target)
        }
        "stop" => {
            if charger.stop() {
                Outcome::applied("Charging session stopped")
            } else {
                Outcome::noop(format!("{name} is not charging; nothing to stop"))
            }
        }
        other => Outcome::generic(other, name),
    }
}

fn vending(
    machine: &mut VendingMachine,
    request: &ActionRequest,
    device_id: &str,
    name: &str,
) -> Outcome {
    let slot = request.str_param("slot").unwrap_or(DEFAULT_SLOT).to_owned();
    let product = request
        .str_param("product")
        .unwrap_or_else(|| VendingMachine::product_for_slot(&slot))
        .to_owned();

    match request.action.as_str() {
        "dispense" => match machine.dispense(&slot) {
            Some(remaining) => {
                let dispense_id = new_record_id("disp");
                let dispense_proof = derive_proof_token(&[&dispense_id, &request.proof, device_id]);
                Outcome::applied(format!("Dispensed {product} from slot {slot}"))
                    .with("dispense_id", dispense_id)
                    .with("dispense_proof", dispense_proof)
                    .with("product", product)
                    .with("slot", slot)
                    .with("remaining_stock", remaining)
            }
            None => Outcome::noop(format!("Slot {slot} is empty or unknown"))
                .with("slot", slot),
        },
        "restock" => {
            let quantity = request.u32_param("quantity").unwrap_or(DEFAULT_RESTOCK_QTY);
            match machine.restock(&slot, quantity) {
                Some(level) => {
                    let restock_id = new_record_id("rstk");
                    let restock_proof =
                        derive_proof_token(&[&restock_id, &request.proof, device_id]);
                    Outcome::applied(format!("Restocked slot {slot} with {quantity} x {product}"))
                        .with("restock_id", restock_id)
                        .with("restock_proof", restock_proof)
                        .with("product", product)
                        .with("quantity", quantity)
                        .with("slot", slot)
                        .with("stock_level", level)
                }
                None => Outcome::noop(format!("Slot {slot} is unknown")).with("slot", slot),
            }
        }
        other => Outcome::generic(other, name),
    }
}

#[cfg(test)]
mod tests {
    use iotpay_core::default_fleet;
    use iotpay_core::simulator::ChargerMode;
    use serde_json::json;

    use super::*;

    const PROOF: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

    fn device(idx: usize) -> Device {
        default_fleet().swap_remove(idx)
    }

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn unlock_records_truncated_actor_and_arms_timer() {
        let mut lock = device(2);
        let result = execute(&mut lock, &ActionRequest::new("unlock", PROOF));
        assert!(result.success && result.applied);
        assert_eq!(result.transaction_hash, PROOF);
        match lock.state() {
            DeviceState::SmartLock(l) => {
                assert!(!l.is_locked());
                assert_eq!(l.auto_lock_timer_sec(), 300);
                assert_eq!(l.last_unlocked_by(), "0x1234...cdef");
            }
            other => panic!("expected smart lock, got {other:?}"),
        }
    }

    #[test]
    fn lock_zeroes_countdown() {
        let mut lock = device(2);
        execute(&mut lock, &ActionRequest::new("unlock", PROOF));
        execute(&mut lock, &ActionRequest::new("lock", "free_action"));
        match lock.state() {
            DeviceState::SmartLock(l) => {
                assert!(l.is_locked());
                assert_eq!(l.auto_lock_timer_sec(), 0);
            }
            other => panic!("expected smart lock, got {other:?}"),
        }
    }

    #[test]
    fn print_while_printing_is_a_noop() {
        let mut printer = device(1);
        let result = execute(&mut printer, &ActionRequest::new("print", PROOF));
        assert!(result.success);
        assert!(!result.applied);
        assert!(result.extra.get("job_id").is_none());
    }

    #[test]
    fn print_from_idle_starts_job_with_derived_proof() {
        let mut printer = device(1);
        execute(&mut printer, &ActionRequest::new("cancel", "free_action"));
        let request = ActionRequest::new("print", PROOF)
            .with_params(params(json!({"file_name": "gear.gcode"})));
        let result = execute(&mut printer, &request);
        assert!(result.applied);

        let job_id = result.extra.get("job_id").and_then(Value::as_str).unwrap_or_default();
        let expected = derive_proof_token(&[job_id, PROOF, "printer-3d-01"]);
        assert_eq!(result.extra.get("job_proof").and_then(Value::as_str), Some(expected.as_str()));

        let file_name = result.extra.get("file_name").and_then(Value::as_str).unwrap_or_default();
        assert!(file_name.ends_with("_gear.gcode"), "got {file_name}");
        match printer.state() {
            DeviceState::Printer(p) => {
                assert_eq!(p.mode(), PrinterMode::Printing);
                assert!(p.progress_percent().abs() < f64::EPSILON);
                assert_eq!(p.current_file(), Some(file_name));
            }
            other => panic!("expected printer, got {other:?}"),
        }
    }

    #[test]
    fn buy_filament_echoes_params_without_touching_mode() {
        let mut printer = device(1);
        let request = ActionRequest::new("buy_filament", PROOF)
            .with_params(params(json!({"material": "PETG", "color": "red", "weight_g": "750"})));
        let result = execute(&mut printer, &request);
        assert_eq!(result.extra["material"], "PETG");
        assert_eq!(result.extra["color"], "red");
        assert_eq!(result.extra["weight_g"], 750);
        assert!(result.extra.contains_key("purchase_proof"));
        match printer.state() {
            DeviceState::Printer(p) => assert_eq!(p.mode(), PrinterMode::Printing),
            other => panic!("expected printer, got {other:?}"),
        }
    }

    #[test]
    fn pause_resume_cancel_cycle() {
        let mut printer = device(1);
        assert!(execute(&mut printer, &ActionRequest::new("pause", "free_action")).applied);
        assert!(!execute(&mut printer, &ActionRequest::new("pause", "free_action")).applied);
        assert!(execute(&mut printer, &ActionRequest::new("resume", "free_action")).applied);
        assert!(execute(&mut printer, &ActionRequest::new("cancel", "free_action")).applied);
        let again = execute(&mut printer, &ActionRequest::new("cancel", "free_action"));
        assert!(again.success && !again.applied);
        match printer.state() {
            DeviceState::Printer(p) => {
                assert_eq!(p.mode(), PrinterMode::Idle);
                assert_eq!(p.current_file(), None);
            }
            other => panic!("expected printer, got {other:?}"),
        }
    }

    #[test]
    fn charge_and_stop() {
        let mut charger = device(0);
        let stopped = execute(&mut charger, &ActionRequest::new("stop", "free_action"));
        assert!(stopped.applied);
        let noop = execute(&mut charger, &ActionRequest::new("stop", "free_action"));
        assert!(!noop.applied);

        let request = ActionRequest::new("charge", PROOF)
            .with_params(params(json!({"target_percent": 90})));
        let result = execute(&mut charger, &request);
        assert_eq!(result.extra["target_percent"], 90);
        match charger.state() {
            DeviceState::EvCharger(c) => assert_eq!(c.mode(), ChargerMode::Charging),
            other => panic!("expected charger, got {other:?}"),
        }
    }

    // Dispense and restock apply their stock change; the periodic tick's
    // spontaneous purchases and these actions share the same stock levels.
    #[test]
    fn dispense_decrements_stock() {
        let mut machine = device(3);
        let request = ActionRequest::new("dispense", PROOF)
            .with_params(params(json!({"slot": "B2"})));
        let result = execute(&mut machine, &request);
        assert!(result.applied);
        assert_eq!(result.extra["product"], "Water");
        assert_eq!(result.extra["remaining_stock"], 0);

        let empty = execute(&mut machine, &request);
        assert!(empty.success && !empty.applied);
        match machine.state() {
            DeviceState::Vending(v) => assert_eq!(v.stock("B2"), Some(0)),
            other => panic!("expected vending machine, got {other:?}"),
        }
    }

    #[test]
    fn restock_increments_stock() {
        let mut machine = device(3);
        let request = ActionRequest::new("restock", "free_action")
            .with_params(params(json!({"slot": "A2", "quantity": 3})));
        let result = execute(&mut machine, &request);
        assert_eq!(result.extra["stock_level"], 5);
        assert!(result.extra.contains_key("restock_proof"));
        match machine.state() {
            DeviceState::Vending(v) => assert_eq!(v.stock("A2"), Some(5)),
            other => panic!("expected vending machine, got {other:?}"),
        }
    }

    #[test]
    fn restock_of_unknown_slot_is_noop() {
        let mut machine = device(3);
        let request = ActionRequest::new("restock", "free_action")
            .with_params(params(json!({"slot": "Z9", "quantity": 3})));
        let result = execute(&mut machine, &request);
        assert!(result.success && !result.applied);
        assert!(!result.extra.contains_key("restock_proof"));
        match machine.state() {
            DeviceState::Vending(v) => {
                assert_eq!(v.stock("Z9"), None);
                assert_eq!(v.total_stock(), 30);
            }
            other => panic!("expected vending machine, got {other:?}"),
        }
    }

    #[test]
    fn camera_and_unknown_actions_are_generic() {
        let mut camera = device(4);
        let result = execute(&mut camera, &ActionRequest::new("view_stream", PROOF));
        assert!(result.success && !result.applied);
        assert!(result.extra.is_empty());

        let mut lock = device(2);
        let result = execute(&mut lock, &ActionRequest::new("self_destruct", PROOF));
        assert!(result.success && !result.applied);
        match lock.state() {
            DeviceState::SmartLock(l) => assert!(l.is_locked()),
            other => panic!("expected smart lock, got {other:?}"),
        }
    }

    #[test]
    fn result_serializes_extra_fields_flat() {
        let mut machine = device(3);
        let result = execute(&mut machine, &ActionRequest::new("dispense", PROOF));
        let json = match serde_json::to_value(&result) {
            Ok(v) => v,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(json["slot"], "A1");
        assert_eq!(json["device_status"]["type"], "vending_machine");
        assert_eq!(json["transaction_hash"], PROOF);
    }

    #[test]
    fn truncate_proof_is_char_safe() {
        assert_eq!(truncate_proof("free_action"), "free_action");
        assert_eq!(truncate_proof("ééééééééééééééééé"), "éééééé...éééé");
    }
}
