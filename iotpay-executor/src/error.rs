//! Error types for the executor crate.

use iotpay_core::CoreError;

/// Errors surfaced by the device hub and its handle.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// Lookup or validation failure from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The hub task has stopped and can no longer serve commands.
    #[error("device hub is not running")]
    HubUnavailable,

    /// A simulation clock was configured with a zero period.
    #[error("simulation clock period must be greater than zero")]
    ZeroTickPeriod,

    /// A simulation clock period above [`crate::clock::MAX_TICK_PERIOD`].
    #[error("simulation clock period of {0:?} exceeds one day")]
    TickPeriodTooLong(std::time::Duration),
}

impl ExecutorError {
    /// Returns `true` when the underlying cause is an unknown device.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_not_found())
    }
}
