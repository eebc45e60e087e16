//! Simulation clock: a fixed-period ticker driving every device's simulator.

use std::time::Duration;

use iotpay_core::{DeviceRegistry, TICK_INTERVAL};
use rand::Rng;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::error::ExecutorError;

/// Longest accepted tick period.
pub const MAX_TICK_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Period of the fleet-wide tick.
///
/// Missed ticks are not replayed: a late tick is followed by a full period,
/// so drift is tolerated rather than corrected with a catch-up burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationClock {
    period: Duration,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            period: TICK_INTERVAL,
        }
    }
}

impl SimulationClock {
    /// # Errors
    /// Returns [`ExecutorError::ZeroTickPeriod`] if `period` is zero and
    /// [`ExecutorError::TickPeriodTooLong`] if it exceeds [`MAX_TICK_PERIOD`].
    pub fn new(period: Duration) -> Result<Self, ExecutorError> {
        if period.is_zero() {
            return Err(ExecutorError::ZeroTickPeriod);
        }
        if period > MAX_TICK_PERIOD {
            return Err(ExecutorError::TickPeriodTooLong(period));
        }
        Ok(Self { period })
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticker whose first tick fires one period from now.
    #[must_use]
    pub fn interval(&self) -> Interval {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }
}

/// Advance every registered device once, in registration order.
pub fn advance_all<R: Rng + ?Sized>(registry: &mut DeviceRegistry, rng: &mut R) {
    for device in registry.devices_mut() {
        device.advance(rng);
    }
}

#[cfg(test)]
mod tests {
    use iotpay_core::default_fleet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn zero_period_is_rejected() {
        assert!(matches!(
            SimulationClock::new(Duration::ZERO),
            Err(ExecutorError::ZeroTickPeriod)
        ));
    }

    #[test]
    fn period_is_capped_at_one_day() {
        assert!(SimulationClock::new(MAX_TICK_PERIOD).is_ok());
        for secs in [MAX_TICK_PERIOD.as_secs() + 1, u64::MAX] {
            assert!(matches!(
                SimulationClock::new(Duration::from_secs(secs)),
                Err(ExecutorError::TickPeriodTooLong(_))
            ));
        }
    }

    #[test]
    fn default_period_is_five_seconds() {
        assert_eq!(SimulationClock::default().period(), Duration::from_secs(5));
    }

    #[test]
    fn advance_all_touches_every_device() {
        let mut registry = match DeviceRegistry::new(default_fleet()) {
            Ok(r) => r,
            Err(e) => panic!("default fleet must be valid: {e}"),
        };
        let before: Vec<_> = registry.devices().iter().map(|d| d.last_updated()).collect();
        let mut rng = StdRng::seed_from_u64(7);
        advance_all(&mut registry, &mut rng);
        for (device, earlier) in registry.devices().iter().zip(before) {
            assert!(device.last_updated() >= earlier, "{} was skipped", device.id());
        }
        match registry.find_by_id("ev-station-01").map(|d| d.state()) {
            Ok(iotpay_core::DeviceState::EvCharger(c)) => assert!(c.battery_percent() > 78.0),
            other => panic!("expected charging EV charger, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn interval_first_tick_waits_one_period() {
        let clock = match SimulationClock::new(Duration::from_millis(20)) {
            Ok(c) => c,
            Err(e) => panic!("valid period rejected: {e}"),
        };
        let started = Instant::now();
        let mut ticker = clock.interval();
        ticker.tick().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
