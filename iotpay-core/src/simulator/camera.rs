use rand::Rng;
use serde::Serialize;

use super::{jitter, round_to, Simulate};

const PRIVACY_BANDWIDTH_MBPS: f64 = 0.1;
const BASE_BANDWIDTH_MBPS: f64 = 4.0;
const PER_VIEWER_MBPS: f64 = 0.5;
const MAX_VIEWERS: u32 = 5;

/// Simulated streaming security camera.
#[derive(Debug, Clone)]
pub struct SecurityCamera {
    resolution: &'static str,
    codec: &'static str,
    is_streaming: bool,
    active_viewers: u32,
    bandwidth_usage_mbps: f64,
    privacy_mode: bool,
}

impl Default for SecurityCamera {
    fn default() -> Self {
        Self {
            resolution: "1080p",
            codec: "H.264",
            is_streaming: true,
            active_viewers: 2,
            bandwidth_usage_mbps: 4.5,
            privacy_mode: false,
        }
    }
}

impl SecurityCamera {
    #[must_use]
    pub fn active_viewers(&self) -> u32 {
        self.active_viewers
    }

    #[must_use]
    pub fn bandwidth_usage_mbps(&self) -> f64 {
        self.bandwidth_usage_mbps
    }

    #[must_use]
    pub fn privacy_mode(&self) -> bool {
        self.privacy_mode
    }

    pub fn set_privacy_mode(&mut self, enabled: bool) {
        self.privacy_mode = enabled;
    }
}

impl Simulate for SecurityCamera {
    type Telemetry = CameraTelemetry;

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.privacy_mode {
            self.bandwidth_usage_mbps = PRIVACY_BANDWIDTH_MBPS;
            self.active_viewers = 0;
        } else {
            self.active_viewers = rng.gen_range(0..=MAX_VIEWERS);
            self.bandwidth_usage_mbps = (BASE_BANDWIDTH_MBPS
                + f64::from(self.active_viewers) * PER_VIEWER_MBPS
                + jitter(rng, 0.2))
            .max(0.0);
        }
    }

    fn snapshot(&self) -> CameraTelemetry {
        CameraTelemetry {
            is_streaming: self.is_streaming,
            resolution: self.resolution,
            codec: self.codec,
            active_viewers: self.active_viewers,
            bandwidth_usage_mbps: round_to(self.bandwidth_usage_mbps, 1),
            privacy_mode: if self.privacy_mode { "ON" } else { "OFF" },
        }
    }

    fn status_label(&self) -> &'static str {
        if self.privacy_mode {
            "PRIVACY"
        } else {
            "STREAMING"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraTelemetry {
    pub is_streaming: bool,
    pub resolution: &'static str,
    pub codec: &'static str,
    pub active_viewers: u32,
    pub bandwidth_usage_mbps: f64,
    pub privacy_mode: &'static str,
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn viewers_and_bandwidth_track_each_other() {
        let mut rng = StdRng::seed_from_u64(41);
        let mut camera = SecurityCamera::default();
        for _ in 0..100 {
            camera.advance(&mut rng);
            let viewers = camera.active_viewers();
            assert!(viewers <= MAX_VIEWERS);
            let expected = 4.0 + f64::from(viewers) * 0.5;
            assert!((camera.bandwidth_usage_mbps() - expected).abs() <= 0.2 + 1e-9);
        }
    }

    #[test]
    fn privacy_mode_collapses_stream() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut camera = SecurityCamera::default();
        camera.set_privacy_mode(true);
        camera.advance(&mut rng);
        assert_eq!(camera.active_viewers(), 0);
        assert!((camera.bandwidth_usage_mbps() - 0.1).abs() < f64::EPSILON);
        assert_eq!(camera.status_label(), "PRIVACY");
        assert_eq!(camera.snapshot().privacy_mode, "ON");
    }
}
