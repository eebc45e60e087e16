use rand::Rng;
use serde::Serialize;

use super::{jitter, round_to, Simulate, TICK_SECS};

const NOZZLE_SETPOINT_C: f64 = 210.0;
const BED_SETPOINT_C: f64 = 60.0;
const AMBIENT_C: f64 = 25.0;
/// Nozzle temperature below which a cooling printer is idle again.
const COOLED_THRESHOLD_C: f64 = 50.0;
const COOLING_STEP_C: f64 = 5.0;
const PROGRESS_STEP: f64 = 0.5;

/// Operating mode of the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrinterMode {
    Idle,
    Printing,
    Paused,
    Cooling,
}

impl PrinterMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PrinterMode::Idle => "IDLE",
            PrinterMode::Printing => "PRINTING",
            PrinterMode::Paused => "PAUSED",
            PrinterMode::Cooling => "COOLING",
        }
    }
}

/// Simulated FDM 3D printer.
#[derive(Debug, Clone)]
pub struct Printer3d {
    model: &'static str,
    material: &'static str,
    mode: PrinterMode,
    progress_percent: f64,
    nozzle_temp_c: f64,
    bed_temp_c: f64,
    current_file: Option<String>,
    time_remaining_sec: u32,
}

impl Default for Printer3d {
    fn default() -> Self {
        Self {
            model: "Prusa i3 MK3S",
            material: "PLA",
            mode: PrinterMode::Printing,
            progress_percent: 45.5,
            nozzle_temp_c: NOZZLE_SETPOINT_C,
            bed_temp_c: BED_SETPOINT_C,
            current_file: Some("benchy_boat.gcode".to_owned()),
            time_remaining_sec: 1240,
        }
    }
}

impl Printer3d {
    #[must_use]
    pub fn mode(&self) -> PrinterMode {
        self.mode
    }

    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    #[must_use]
    pub fn nozzle_temp_c(&self) -> f64 {
        self.nozzle_temp_c
    }

    #[must_use]
    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    #[must_use]
    pub fn material(&self) -> &'static str {
        self.material
    }

    /// Start a new job from zero progress.
    pub fn start_job(&mut self, file_name: String) {
        self.mode = PrinterMode::Printing;
        self.progress_percent = 0.0;
        self.current_file = Some(file_name);
        self.time_remaining_sec = job_duration_sec();
    }

    /// Pause a running job. Returns `false` if nothing was printing.
    pub fn pause(&mut self) -> bool {
        if self.mode != PrinterMode::Printing {
            return false;
        }
        self.mode = PrinterMode::Paused;
        true
    }

    /// Resume a paused job. Returns `false` if the printer was not paused.
    pub fn resume(&mut self) -> bool {
        if self.mode != PrinterMode::Paused {
            return false;
        }
        self.mode = PrinterMode::Printing;
        true
    }

    /// Abort a running or paused job. Returns `false` if there was none.
    pub fn cancel(&mut self) -> bool {
        if !matches!(self.mode, PrinterMode::Printing | PrinterMode::Paused) {
            return false;
        }
        self.mode = PrinterMode::Idle;
        self.progress_percent = 0.0;
        self.current_file = None;
        self.time_remaining_sec = 0;
        true
    }
}

impl Simulate for Printer3d {
    type Telemetry = PrinterTelemetry;

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.mode {
            PrinterMode::Printing => {
                self.nozzle_temp_c = NOZZLE_SETPOINT_C + jitter(rng, 0.5);
                self.bed_temp_c = BED_SETPOINT_C + jitter(rng, 0.2);
                if self.progress_percent < 100.0 {
                    self.progress_percent = (self.progress_percent + PROGRESS_STEP).min(100.0);
                    self.time_remaining_sec = self.time_remaining_sec.saturating_sub(TICK_SECS);
                } else {
                    self.mode = PrinterMode::Cooling;
                }
            }
            PrinterMode::Cooling => {
                self.nozzle_temp_c = (self.nozzle_temp_c - COOLING_STEP_C).max(AMBIENT_C);
                if self.nozzle_temp_c < COOLED_THRESHOLD_C {
                    self.mode = PrinterMode::Idle;
                    self.progress_percent = 0.0;
                }
            }
            PrinterMode::Idle | PrinterMode::Paused => {}
        }
    }

    fn snapshot(&self) -> PrinterTelemetry {
        PrinterTelemetry {
            status: self.mode,
            model: self.model,
            material: self.material,
            progress_percent: round_to(self.progress_percent, 1),
            nozzle_temp_c: round_to(self.nozzle_temp_c, 1),
            bed_temp_c: round_to(self.bed_temp_c, 1),
            current_file: self.current_file.clone(),
            time_remaining_sec: self.time_remaining_sec,
        }
    }

    fn status_label(&self) -> &'static str {
        self.mode.as_str()
    }
}

/// Seconds a fresh job needs at one progress step per tick.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn job_duration_sec() -> u32 {
    (100.0 / PROGRESS_STEP) as u32 * TICK_SECS
}

#[derive(Debug, Clone, Serialize)]
pub struct PrinterTelemetry {
    pub status: PrinterMode,
    pub model: &'static str,
    pub material: &'static str,
    pub progress_percent: f64,
    pub nozzle_temp_c: f64,
    pub bed_temp_c: f64,
    pub current_file: Option<String>,
    pub time_remaining_sec: u32,
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn print_cycle_runs_printing_cooling_idle() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut printer = Printer3d::default();
        let mut previous = printer.progress_percent();

        while printer.mode() == PrinterMode::Printing && printer.progress_percent() < 100.0 {
            printer.advance(&mut rng);
            assert!(printer.progress_percent() >= previous, "progress must not decrease");
            assert!(printer.progress_percent() <= 100.0, "progress must cap at 100");
            previous = printer.progress_percent();
        }
        assert!((printer.progress_percent() - 100.0).abs() < f64::EPSILON);

        printer.advance(&mut rng);
        assert_eq!(
            printer.mode(),
            PrinterMode::Cooling,
            "capped job must start cooling within one tick"
        );

        let mut ticks = 0;
        while printer.mode() == PrinterMode::Cooling {
            printer.advance(&mut rng);
            ticks += 1;
            assert!(ticks < 100, "cooling must terminate");
        }
        assert_eq!(printer.mode(), PrinterMode::Idle);
        assert!(printer.progress_percent().abs() < f64::EPSILON, "idle printer resets progress");
        assert!(printer.nozzle_temp_c() < 50.0);
    }

    #[test]
    fn printing_holds_temperatures_near_setpoints() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut printer = Printer3d::default();
        for _ in 0..20 {
            printer.advance(&mut rng);
            let t = printer.snapshot();
            assert!((209.5..=210.5).contains(&t.nozzle_temp_c));
            assert!((59.8..=60.2).contains(&t.bed_temp_c));
        }
    }

    #[test]
    fn paused_printer_does_not_progress() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut printer = Printer3d::default();
        assert!(printer.pause());
        let progress = printer.progress_percent();
        for _ in 0..5 {
            printer.advance(&mut rng);
        }
        assert!((printer.progress_percent() - progress).abs() < f64::EPSILON);
        assert!(printer.resume());
        printer.advance(&mut rng);
        assert!(printer.progress_percent() > progress);
    }

    #[test]
    fn cancel_clears_job_and_is_noop_when_idle() {
        let mut printer = Printer3d::default();
        assert!(printer.cancel());
        assert_eq!(printer.mode(), PrinterMode::Idle);
        assert!(printer.current_file().is_none());
        assert!(!printer.cancel());
        assert!(!printer.pause());
        assert!(!printer.resume());
    }

    #[test]
    fn start_job_resets_progress() {
        let mut printer = Printer3d::default();
        printer.start_job("gear.gcode".to_owned());
        assert_eq!(printer.mode(), PrinterMode::Printing);
        assert!(printer.progress_percent().abs() < f64::EPSILON);
        assert_eq!(printer.current_file(), Some("gear.gcode"));
        assert_eq!(printer.snapshot().time_remaining_sec, 1000);
    }

    #[test]
    fn time_remaining_counts_down_only_while_printing() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut printer = Printer3d::default();
        let mut remaining = printer.snapshot().time_remaining_sec;
        for _ in 0..10 {
            printer.advance(&mut rng);
            let now = printer.snapshot().time_remaining_sec;
            assert_eq!(now, remaining - TICK_SECS);
            remaining = now;
        }

        assert!(printer.pause());
        for _ in 0..10 {
            printer.advance(&mut rng);
            assert_eq!(printer.snapshot().time_remaining_sec, remaining);
        }
    }
}
