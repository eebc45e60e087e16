//! Chain and payment descriptors advertised to clients.

use iotpay_core::Price;
use serde::Serialize;

/// Where and in what token payments are expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub token: String,
    pub recipient: String,
    pub rpc_url: String,
}

impl ChainConfig {
    pub fn new(
        chain_id: u64,
        chain_name: impl Into<String>,
        token: impl Into<String>,
        recipient: impl Into<String>,
        rpc_url: impl Into<String>,
    ) -> Self {
        Self {
            chain_id,
            chain_name: chain_name.into(),
            token: token.into(),
            recipient: recipient.into(),
            rpc_url: rpc_url.into(),
        }
    }

    /// Base Sepolia testnet, paid in ETH.
    pub fn base_sepolia(recipient: impl Into<String>) -> Self {
        Self::new(84532, "Base Sepolia", "ETH", recipient, "https://sepolia.base.org")
    }
}

/// Challenge body telling a client what to pay before retrying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub chain_id: u64,
    pub chain_name: String,
    pub token: String,
    pub recipient: String,
    pub amount: Price,
    pub description: String,
}
