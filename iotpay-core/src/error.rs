/// Errors produced by the `iotpay-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// No device is registered under the given id.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// No device is registered under the given URL alias.
    #[error("device alias not found: {0}")]
    AliasNotFound(String),

    /// No device is registered under the given symbolic domain.
    #[error("symbolic domain not found: {0}")]
    DomainNotFound(String),

    /// The fleet handed to the registry violates an identity invariant.
    #[error("invalid fleet definition for '{id}': {reason}")]
    InvalidFleet { id: String, reason: String },

    /// A payment proof does not have the `0x` + 64 hex digit shape.
    #[error("invalid payment proof: {reason}")]
    InvalidProof { reason: String },
}

impl CoreError {
    /// Returns `true` for the lookup failures that map to "not found".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotFound(_) | Self::AliasNotFound(_) | Self::DomainNotFound(_)
        )
    }
}
