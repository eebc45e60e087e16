//! Applies admitted actions to simulated devices and keeps the fleet ticking.
//!
//! All device state lives inside one [`DeviceHub`] task. HTTP handlers reach
//! it through a cloneable [`HubHandle`], and the [`SimulationClock`] is polled
//! in the same task, so ticks and actions never interleave.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod actions;
pub mod clock;
pub mod error;
pub mod hub;
pub mod receipt;

pub use actions::{execute, ActionRequest, ActionResult};
pub use clock::{advance_all, SimulationClock};
pub use error::ExecutorError;
pub use hub::{DeviceHub, DeviceProfile, HubHandle};
pub use receipt::{derive_proof_token, new_record_id};
