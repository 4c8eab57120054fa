//! Adaptive RMS silence checker with hysteresis and smoothing.
//!
//! ## Algorithm
//!
//! 1. Compute the mean-removed RMS of the incoming buffer.
//! 2. Smooth it with a moving average over the last `smoothing_window` values.
//! 3. Apply asymmetric hysteresis around the adaptive threshold:
//!    entering silence requires `smoothed <= threshold`, leaving it requires
//!    `smoothed > threshold * hysteresis_multiplier`. The gap between the
//!    two thresholds keeps the state from fluttering at the boundary.

use std::collections::VecDeque;

use super::{volume_rms, SilenceChecker};

/// Default RMS level below which a buffer counts as silence.
pub const DEFAULT_BASE_THRESHOLD: f64 = 0.00001;
/// Default ratio between the exit and enter thresholds.
pub const DEFAULT_HYSTERESIS_MULTIPLIER: f64 = 5.0;
/// Default moving-average window, in buffers.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;
/// Default margin applied above a calibrated noise floor.
pub const DEFAULT_CALIBRATION_MULTIPLIER: f64 = 2.0;

/// The default `SilenceChecker`: adaptive threshold, moving-average
/// smoothing, and dual-threshold hysteresis.
#[derive(Debug, Clone)]
pub struct AdaptiveSilenceChecker {
    base_threshold: f64,
    hysteresis_multiplier: f64,
    smoothing_window: usize,
    calibration_multiplier: f64,

    rms_history: VecDeque<f64>,
    adaptive_threshold: f64,
    in_silence: bool,
    calibrated: bool,
}

impl AdaptiveSilenceChecker {
    pub fn new(
        base_threshold: f64,
        hysteresis_multiplier: f64,
        smoothing_window: usize,
        calibration_multiplier: f64,
    ) -> Self {
        let smoothing_window = smoothing_window.max(1);
        Self {
            base_threshold,
            hysteresis_multiplier,
            smoothing_window,
            calibration_multiplier,
            rms_history: VecDeque::with_capacity(smoothing_window),
            adaptive_threshold: base_threshold,
            in_silence: false,
            calibrated: false,
        }
    }

    /// Inserts the current RMS into the bounded history and returns the
    /// moving average.
    fn update_and_smooth(&mut self, current_rms: f64) -> f64 {
        self.rms_history.push_back(current_rms);
        while self.rms_history.len() > self.smoothing_window {
            self.rms_history.pop_front();
        }
        self.rms_history.iter().sum::<f64>() / self.rms_history.len() as f64
    }
}

impl Default for AdaptiveSilenceChecker {
    fn default() -> Self {
        Self::new(
            DEFAULT_BASE_THRESHOLD,
            DEFAULT_HYSTERESIS_MULTIPLIER,
            DEFAULT_SMOOTHING_WINDOW,
            DEFAULT_CALIBRATION_MULTIPLIER,
        )
    }
}

impl SilenceChecker for AdaptiveSilenceChecker {
    fn calibrate(&mut self, buffer: &[f64]) {
        if buffer.is_empty() {
            return;
        }
        let noise_floor = volume_rms(buffer);
        self.adaptive_threshold = self
            .base_threshold
            .max(noise_floor * self.calibration_multiplier);
        self.calibrated = true;
    }

    fn is_silence(&mut self, buffer: &[f64]) -> bool {
        if buffer.is_empty() {
            // Maximal loudness by definition; state is left untouched.
            return false;
        }

        let smoothed = self.update_and_smooth(volume_rms(buffer));

        let enter_threshold = self.adaptive_threshold;
        let exit_threshold = self.adaptive_threshold * self.hysteresis_multiplier;

        if self.in_silence {
            if smoothed > exit_threshold {
                self.in_silence = false;
            }
        } else if smoothed <= enter_threshold {
            self.in_silence = true;
        }

        self.in_silence
    }

    fn reset(&mut self) {
        self.rms_history.clear();
        self.in_silence = false;
        // Calibrated threshold is kept.
    }

    fn current_threshold(&self) -> f64 {
        self.adaptive_threshold
    }

    fn is_calibrated(&self) -> bool {
        self.calibrated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    /// Alternating +/- amplitude: zero mean, RMS exactly `amplitude`.
    fn buffer_with_rms(amplitude: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect()
    }

    #[test]
    fn quiet_buffer_enters_silence() {
        let mut checker = AdaptiveSilenceChecker::default();
        assert!(checker.is_silence(&vec![0.0; 1024]));
    }

    #[test]
    fn loud_buffer_stays_in_sound() {
        let mut checker = AdaptiveSilenceChecker::default();
        assert!(!checker.is_silence(&buffer_with_rms(0.5, 1024)));
    }

    #[test]
    fn empty_buffer_is_never_silent_and_leaves_state_alone() {
        let mut checker = AdaptiveSilenceChecker::default();
        assert!(checker.is_silence(&vec![0.0; 256]));

        // Empty buffer reports non-silence without flipping the state.
        assert!(!checker.is_silence(&[]));
        assert!(checker.is_silence(&vec![0.0; 256]));
    }

    #[test]
    fn hysteresis_holds_silence_between_thresholds() {
        // Window of 1 isolates hysteresis from smoothing.
        let mut checker = AdaptiveSilenceChecker::new(0.01, 5.0, 1, 2.0);

        assert!(checker.is_silence(&buffer_with_rms(0.001, 256)));

        // Above enter (0.01) but below exit (0.05): still silent.
        assert!(checker.is_silence(&buffer_with_rms(0.03, 256)));

        // Above exit: back to sound.
        assert!(!checker.is_silence(&buffer_with_rms(0.06, 256)));

        // Between the thresholds from the sound side: stays sound.
        assert!(!checker.is_silence(&buffer_with_rms(0.03, 256)));
    }

    #[test]
    fn silence_is_monotonic_under_decreasing_then_flat_rms() {
        let mut checker = AdaptiveSilenceChecker::new(0.01, 5.0, 3, 2.0);

        let mut levels = vec![0.02, 0.012, 0.005, 0.002];
        levels.extend(std::iter::repeat(0.001).take(10));

        let mut seen_silence = false;
        for level in levels {
            let silent = checker.is_silence(&buffer_with_rms(level, 256));
            if seen_silence {
                assert!(silent, "silence must hold until RMS exceeds the exit threshold");
            }
            seen_silence |= silent;
        }
        assert!(seen_silence);
    }

    #[test]
    fn smoothing_rejects_single_buffer_transient() {
        let mut checker = AdaptiveSilenceChecker::new(0.01, 5.0, 4, 2.0);

        for _ in 0..4 {
            assert!(checker.is_silence(&vec![0.0; 256]));
        }

        // One loud spike smoothed over four quiet readings:
        // avg = 0.08 / 4 = 0.02 < exit threshold 0.05 — still silent.
        assert!(checker.is_silence(&buffer_with_rms(0.08, 256)));

        // A sustained loud signal pushes the average over the exit threshold.
        assert!(!checker.is_silence(&buffer_with_rms(0.3, 256)));
    }

    #[test]
    fn calibration_raises_threshold_above_noise_floor() {
        let mut checker = AdaptiveSilenceChecker::new(0.00001, 5.0, 5, 2.0);
        assert!(!checker.is_calibrated());

        checker.calibrate(&buffer_with_rms(0.1, 512));
        assert!(checker.is_calibrated());
        assert_relative_eq!(checker.current_threshold(), 0.2, max_relative = 1e-9);

        // Idempotent: a later calibration overwrites the threshold.
        checker.calibrate(&buffer_with_rms(0.01, 512));
        assert_relative_eq!(checker.current_threshold(), 0.02, max_relative = 1e-9);
    }

    #[test]
    fn calibration_never_drops_below_base_threshold() {
        let mut checker = AdaptiveSilenceChecker::new(0.05, 5.0, 5, 2.0);
        checker.calibrate(&vec![0.0; 512]);
        assert_eq!(checker.current_threshold(), 0.05);
    }

    #[test]
    fn calibrate_ignores_empty_buffer() {
        let mut checker = AdaptiveSilenceChecker::default();
        checker.calibrate(&[]);
        assert!(!checker.is_calibrated());
    }

    #[test]
    fn reset_clears_state_but_keeps_calibration() {
        let mut checker = AdaptiveSilenceChecker::new(0.01, 5.0, 5, 2.0);
        checker.calibrate(&buffer_with_rms(0.1, 512));
        assert!(checker.is_silence(&vec![0.0; 256]));

        checker.reset();
        assert!(checker.is_calibrated());
        assert_relative_eq!(checker.current_threshold(), 0.2, max_relative = 1e-9);

        // Fresh state: a loud buffer is classified without stale history.
        assert!(!checker.is_silence(&buffer_with_rms(0.9, 256)));
    }
}
