//! Payment gate deciding whether an action may proceed.
//!
//! The flow for one request:
//! 1. Look up the action's price; free actions are admitted as-is.
//! 2. No proof on a priced action: issue a [`PaymentDetails`] challenge.
//! 3. Malformed proof: reject.
//! 4. Well-formed proof: ask the [`ChainVerifier`], then admit or reject.

use std::fmt;
use std::sync::Arc;

use iotpay_core::{pricing, DeviceType, PaymentProof, Price};
use tracing::{debug, warn};

use crate::chain::{ChainConfig, PaymentDetails};
use crate::verifier::{ChainVerifier, PermissiveVerifier};

/// Proof value handed to the executor for free actions invoked without one.
pub const FREE_ACTION_PROOF: &str = "free_action";

/// Outcome of [`PaymentGate::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Payment is required and no proof was presented.
    Challenge(Box<PaymentDetails>),
    /// A proof was presented for a priced action but is unusable.
    Rejected(String),
    /// The action may run; carries the proof to echo back.
    Admitted(String),
}

pub struct PaymentGate {
    chain: ChainConfig,
    verifier: Arc<dyn ChainVerifier>,
}

impl fmt::Debug for PaymentGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentGate").field("chain", &self.chain).finish_non_exhaustive()
    }
}

impl PaymentGate {
    /// Gate with the format-only [`PermissiveVerifier`].
    #[must_use]
    pub fn new(chain: ChainConfig) -> Self {
        Self::with_verifier(chain, Arc::new(PermissiveVerifier))
    }

    #[must_use]
    pub fn with_verifier(chain: ChainConfig, verifier: Arc<dyn ChainVerifier>) -> Self {
        Self { chain, verifier }
    }

    #[must_use]
    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    #[must_use]
    pub fn requires_payment(&self, device_type: DeviceType, action: &str) -> bool {
        pricing::requires_payment(device_type, action)
    }

    #[must_use]
    pub fn price_for(&self, device_type: DeviceType, action: &str) -> Price {
        pricing::price_for(device_type, action)
    }

    /// Challenge body for a priced action.
    #[must_use]
    pub fn payment_details(&self, device_type: DeviceType, action: &str) -> PaymentDetails {
        PaymentDetails {
            chain_id: self.chain.chain_id,
            chain_name: self.chain.chain_name.clone(),
            token: self.chain.token.clone(),
            recipient: self.chain.recipient.clone(),
            amount: self.price_for(device_type, action),
            description: format!("Payment for '{action}' on {device_type}"),
        }
    }

    /// Decide whether `action` on a device of `device_type` may run.
    ///
    /// `proof` is the raw value from the request, already stripped of any
    /// `Bearer ` prefix; `None` means no proof was sent.
    pub async fn evaluate(
        &self,
        proof: Option<&str>,
        device_type: DeviceType,
        action: &str,
    ) -> GateDecision {
        let price = self.price_for(device_type, action);
        if price.is_free() {
            return GateDecision::Admitted(proof.unwrap_or(FREE_ACTION_PROOF).to_owned());
        }

        let Some(raw) = proof else {
            debug!(%device_type, action, %price, "payment required");
            return GateDecision::Challenge(Box::new(self.payment_details(device_type, action)));
        };

        let proof = match PaymentProof::parse(raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(%device_type, action, error = %e, "malformed payment proof");
                return GateDecision::Rejected(e.to_string());
            }
        };

        if self.verifier.verify(&proof, &self.chain.recipient, price).await {
            GateDecision::Admitted(proof.into_string())
        } else {
            warn!(%device_type, action, proof = %proof, "payment proof failed verification");
            GateDecision::Rejected(format!("payment {proof} could not be verified"))
        }
    }
}
