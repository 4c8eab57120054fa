//! Silence classification over decoded frame buffers.
//!
//! The `SilenceChecker` trait is the extensibility seam: the pipeline only
//! sees the trait, so a spectral or model-based checker can replace the
//! default `AdaptiveSilenceChecker` without touching the segmentation code.

pub mod adaptive;

pub use adaptive::AdaptiveSilenceChecker;

/// Per-stream stateful silence classifier.
///
/// One instance belongs to exactly one file's pipeline; implementations
/// may keep history (smoothing windows, hysteresis state) between calls.
pub trait SilenceChecker: Send {
    /// Establishes an adaptive threshold from a reference buffer of the
    /// stream's noise floor. Idempotent; later calls overwrite.
    fn calibrate(&mut self, buffer: &[f64]);

    /// Classifies one frame buffer, updating the internal silence state.
    fn is_silence(&mut self, buffer: &[f64]) -> bool;

    /// Clears smoothing history and the silence flag. A calibrated
    /// threshold survives the reset.
    fn reset(&mut self);

    /// The threshold currently in effect (base or calibrated).
    fn current_threshold(&self) -> f64;

    fn is_calibrated(&self) -> bool;
}

/// Root-mean-square loudness of a buffer, measured around its mean.
///
/// An empty buffer reads as maximal loudness so that it can never be
/// classified as silence.
pub fn volume_rms(buffer: &[f64]) -> f64 {
    if buffer.is_empty() {
        return f64::MAX;
    }
    let mean = buffer.iter().sum::<f64>() / buffer.len() as f64;
    let mean_square = buffer.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / buffer.len() as f64;
    mean_square.sqrt()
}
