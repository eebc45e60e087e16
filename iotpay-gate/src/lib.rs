//! HTTP 402 style payment gate for the iotpay device fleet.
//!
//! Decides per `(device type, action)` whether a request must carry a payment
//! proof, checks the proof's shape, optionally hands it to a pluggable
//! [`ChainVerifier`], and builds the structured challenge returned with
//! "payment required" responses.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod chain;
pub mod gate;
pub mod verifier;

pub use chain::{ChainConfig, PaymentDetails};
pub use gate::{GateDecision, PaymentGate, FREE_ACTION_PROOF};
pub use verifier::{ChainVerifier, PermissiveVerifier};
