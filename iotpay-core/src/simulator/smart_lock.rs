use rand::Rng;
use serde::Serialize;

use super::{Simulate, TICK_SECS};

const BATTERY_DRAIN_PER_TICK: f64 = 0.001;

/// Seconds an unlocked door stays open before re-locking itself.
pub const AUTO_LOCK_SECS: u32 = 300;

/// Simulated Wi-Fi door lock.
#[derive(Debug, Clone)]
pub struct SmartLock {
    model: &'static str,
    is_locked: bool,
    battery_level: f64,
    last_unlocked_by: String,
    auto_lock_timer_sec: u32,
    access_log_count: u32,
}

impl Default for SmartLock {
    fn default() -> Self {
        Self {
            model: "August Wi-Fi Smart Lock Gen 4",
            is_locked: true,
            battery_level: 88.0,
            last_unlocked_by: "0x123...abc".to_owned(),
            auto_lock_timer_sec: 0,
            access_log_count: 12,
        }
    }
}

impl SmartLock {
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    #[must_use]
    pub fn battery_level(&self) -> f64 {
        self.battery_level
    }

    #[must_use]
    pub fn auto_lock_timer_sec(&self) -> u32 {
        self.auto_lock_timer_sec
    }

    #[must_use]
    pub fn last_unlocked_by(&self) -> &str {
        &self.last_unlocked_by
    }

    /// Unlock on behalf of `actor` and arm the auto-lock countdown.
    pub fn unlock(&mut self, actor: String) {
        self.is_locked = false;
        self.last_unlocked_by = actor;
        self.auto_lock_timer_sec = AUTO_LOCK_SECS;
        self.access_log_count = self.access_log_count.saturating_add(1);
    }

    pub fn lock(&mut self) {
        self.is_locked = true;
        self.auto_lock_timer_sec = 0;
    }
}

impl Simulate for SmartLock {
    type Telemetry = LockTelemetry;

    fn advance<R: Rng + ?Sized>(&mut self, _rng: &mut R) {
        self.battery_level = (self.battery_level - BATTERY_DRAIN_PER_TICK).max(0.0);

        if !self.is_locked {
            self.auto_lock_timer_sec = self.auto_lock_timer_sec.saturating_sub(TICK_SECS);
            if self.auto_lock_timer_sec == 0 {
                self.lock();
            }
        }
    }

    fn snapshot(&self) -> LockTelemetry {
        LockTelemetry {
            is_locked: self.is_locked,
            model: self.model,
            battery_level: format!("{}%", self.battery_level.floor()),
            last_unlocked_by: self.last_unlocked_by.clone(),
            auto_lock_timer_sec: self.auto_lock_timer_sec,
            access_log_count: self.access_log_count,
        }
    }

    fn status_label(&self) -> &'static str {
        if self.is_locked {
            "LOCKED"
        } else {
            "UNLOCKED"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LockTelemetry {
    pub is_locked: bool,
    pub model: &'static str,
    pub battery_level: String,
    pub last_unlocked_by: String,
    pub auto_lock_timer_sec: u32,
    pub access_log_count: u32,
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn battery_is_non_increasing_and_never_negative() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut lock = SmartLock {
            battery_level: 0.0025,
            ..SmartLock::default()
        };
        let mut previous = lock.battery_level();
        for _ in 0..10 {
            lock.advance(&mut rng);
            assert!(lock.battery_level() <= previous);
            assert!(lock.battery_level() >= 0.0);
            previous = lock.battery_level();
        }
        assert!(lock.battery_level().abs() < f64::EPSILON);
    }

    #[test]
    fn unlocked_door_relocks_after_countdown() {
        let mut rng = StdRng::seed_from_u64(22);
        let mut lock = SmartLock::default();
        lock.unlock("0xabc...1234".to_owned());
        assert!(!lock.is_locked());
        assert_eq!(lock.auto_lock_timer_sec(), AUTO_LOCK_SECS);

        let ticks = AUTO_LOCK_SECS / TICK_SECS;
        for _ in 0..ticks - 1 {
            lock.advance(&mut rng);
            assert!(!lock.is_locked(), "must stay unlocked before the countdown ends");
        }
        lock.advance(&mut rng);
        assert!(lock.is_locked(), "must re-lock after countdown / tick ticks");
        assert_eq!(lock.auto_lock_timer_sec(), 0);
    }

    #[test]
    fn unlocked_without_countdown_relocks_next_tick() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut lock = SmartLock {
            is_locked: false,
            ..SmartLock::default()
        };
        lock.advance(&mut rng);
        assert!(lock.is_locked());
    }

    #[test]
    fn snapshot_formats_battery_as_percent_string() {
        let lock = SmartLock::default();
        assert_eq!(lock.snapshot().battery_level, "88%");
        assert_eq!(lock.status_label(), "LOCKED");
    }

    #[test]
    fn unlock_counts_access() {
        let mut lock = SmartLock::default();
        lock.unlock("someone".to_owned());
        assert_eq!(lock.snapshot().access_log_count, 13);
        lock.lock();
        assert!(lock.is_locked());
        assert_eq!(lock.auto_lock_timer_sec(), 0);
    }
}
