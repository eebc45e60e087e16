//! On-chain verification extension point.
//!
//! The gate only checks a proof's shape. A deployment that wants real
//! settlement checks wires a [`ChainVerifier`] into
//! [`PaymentGate::with_verifier`](crate::PaymentGate::with_verifier).

use async_trait::async_trait;
use iotpay_core::{PaymentProof, Price};

/// Confirms that a well-formed proof pays `amount` to `recipient`.
///
/// Implementations must be `Send + Sync` so one verifier can be shared by
/// every request handler.
#[async_trait]
pub trait ChainVerifier: Send + Sync {
    /// Return `true` if the referenced transfer exists and matches.
    ///
    /// Lookup failures should be reported as `false`; the gate then rejects
    /// the proof rather than failing the request.
    async fn verify(&self, proof: &PaymentProof, recipient: &str, amount: Price) -> bool;
}

/// Default verifier: accepts every proof that passed the shape check.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveVerifier;

#[async_trait]
impl ChainVerifier for PermissiveVerifier {
    async fn verify(&self, _proof: &PaymentProof, _recipient: &str, _amount: Price) -> bool {
        true
    }
}
