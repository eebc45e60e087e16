//! Gateway configuration read from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use iotpay_executor::SimulationClock;
use iotpay_gate::ChainConfig;

use crate::error::GatewayError;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_VENDOR_ADDRESS: &str = "0x13EB37a124F98A76c973c3fce0F3FF829c7df57C";
const DEFAULT_RPC_URL: &str = "https://sepolia.base.org";
const DEFAULT_CHAIN_ID: u64 = 84532;
const DEFAULT_CHAIN_NAME: &str = "Base Sepolia";
const DEFAULT_TOKEN: &str = "ETH";
const DEFAULT_TICK_SECS: u64 = 5;

/// Everything the gateway binary needs at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    /// Public base URL handed out by `/resolve`.
    pub base_url: String,
    /// Chain, token and recipient for payment challenges.
    pub chain: ChainConfig,
    pub clock: SimulationClock,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            base_url: DEFAULT_BASE_URL.to_owned(),
            chain: ChainConfig::new(
                DEFAULT_CHAIN_ID,
                DEFAULT_CHAIN_NAME,
                DEFAULT_TOKEN,
                DEFAULT_VENDOR_ADDRESS,
                DEFAULT_RPC_URL,
            ),
            clock: SimulationClock::default(),
        }
    }
}

impl GatewayConfig {
    /// Build from the process environment, falling back to defaults.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidConfig`] if a variable is set to an
    /// unparsable value.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidConfig`] if a variable is set to an
    /// unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GatewayError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let text = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());

        let listen_addr = text("IOTPAY_LISTEN_ADDR", DEFAULT_LISTEN_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| invalid("IOTPAY_LISTEN_ADDR", &e))?;

        let chain_id = match get("CHAIN_ID") {
            Some(v) => v.parse::<u64>().map_err(|e| invalid("CHAIN_ID", &e))?,
            None => DEFAULT_CHAIN_ID,
        };

        let tick_secs = match get("IOTPAY_TICK_SECS") {
            Some(v) => v.parse::<u64>().map_err(|e| invalid("IOTPAY_TICK_SECS", &e))?,
            None => DEFAULT_TICK_SECS,
        };
        let clock = SimulationClock::new(Duration::from_secs(tick_secs))
            .map_err(|e| invalid("IOTPAY_TICK_SECS", &e))?;

        Ok(Self {
            listen_addr,
            base_url: text("IOTPAY_BASE_URL", DEFAULT_BASE_URL),
            chain: ChainConfig::new(
                chain_id,
                text("CHAIN_NAME", DEFAULT_CHAIN_NAME),
                text("PAYMENT_TOKEN", DEFAULT_TOKEN),
                text("VENDOR_ADDRESS", DEFAULT_VENDOR_ADDRESS),
                text("RPC_URL", DEFAULT_RPC_URL),
            ),
            clock,
        })
    }
}

fn invalid(key: &'static str, err: &dyn std::fmt::Display) -> GatewayError {
    GatewayError::InvalidConfig {
        key,
        reason: err.to_string(),
    }
}
