//! HTTP gateway for the iotpay simulated device fleet.
//!
//! Serves device status and capability manifests, and runs priced actions
//! through the payment gate before handing them to the device hub.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod manifest;
pub mod routes;

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
