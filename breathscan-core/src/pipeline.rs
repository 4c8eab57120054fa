//! Per-file processing pipeline.
//!
//! ## Stages (per buffer)
//!
//! ```text
//! 1. WavReader::read_frames → normalized f64 frame buffer
//! 2. SilenceChecker::is_silence → silent flag
//! 3. PauseSegmenter::advance → pause on a silence→sound transition
//! 4. (end of stream) PauseSegmenter::finish → trailing pause
//! 5. classify → severity grades
//! ```
//!
//! One pipeline owns its reader, checker, and segmenter exclusively;
//! callers run many pipelines in parallel by giving each its own file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{classify, SeverityThresholds};
use crate::error::{BreathscanError, Result};
use crate::pause::BreathingPause;
use crate::segment::{PauseSegmenter, DEFAULT_MIN_PAUSE_SECS};
use crate::silence::adaptive::{
    DEFAULT_BASE_THRESHOLD, DEFAULT_CALIBRATION_MULTIPLIER, DEFAULT_HYSTERESIS_MULTIPLIER,
    DEFAULT_SMOOTHING_WINDOW,
};
use crate::silence::{AdaptiveSilenceChecker, SilenceChecker};
use crate::wav::WavReader;

/// Frames decoded per buffer. At 16 kHz this is a 64 ms analysis window.
const DEFAULT_FRAMES_PER_BUFFER: usize = 1024;

/// Tuning for one file pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    /// RMS level below which a buffer counts as silence. Default: 1e-5.
    pub base_threshold: f64,
    /// Exit-to-enter threshold ratio (> 1). Default: 5.0.
    pub hysteresis_multiplier: f64,
    /// Moving-average window over buffer RMS values. Default: 5.
    pub smoothing_window: usize,
    /// Margin applied above a calibrated noise floor. Default: 2.0.
    pub calibration_multiplier: f64,
    /// Frames decoded per read. Default: 1024.
    pub frames_per_buffer: usize,
    /// Minimum pause duration in seconds. Default: 0.001.
    pub min_pause_secs: f64,
    pub thresholds: SeverityThresholds,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            base_threshold: DEFAULT_BASE_THRESHOLD,
            hysteresis_multiplier: DEFAULT_HYSTERESIS_MULTIPLIER,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            calibration_multiplier: DEFAULT_CALIBRATION_MULTIPLIER,
            frames_per_buffer: DEFAULT_FRAMES_PER_BUFFER,
            min_pause_secs: DEFAULT_MIN_PAUSE_SECS,
            thresholds: SeverityThresholds::default(),
        }
    }
}

/// Detects breathing pauses in one WAV file, unclassified.
///
/// A path that does not exist yields an empty list rather than an error,
/// so one missing file never aborts a batch. Parse and I/O failures are
/// fatal to this file only and carry its identity.
pub fn detect_pauses(path: &Path, config: &DetectorConfig) -> Result<Vec<BreathingPause>> {
    if !path.exists() {
        warn!(path = %path.display(), "input file does not exist, yielding no pauses");
        return Ok(Vec::new());
    }

    let mut reader =
        WavReader::open(path).map_err(|e| BreathscanError::from_wav(path, "opening", e))?;

    info!(
        path = %path.display(),
        channels = reader.num_channels(),
        frames = reader.num_frames(),
        sample_rate = reader.sample_rate(),
        block_align = reader.block_align(),
        valid_bits = reader.valid_bits(),
        bytes_per_sample = reader.bytes_per_sample(),
        "opened audio stream"
    );

    let mut checker = AdaptiveSilenceChecker::new(
        config.base_threshold,
        config.hysteresis_multiplier,
        config.smoothing_window,
        config.calibration_multiplier,
    );
    let mut segmenter =
        PauseSegmenter::with_min_duration(source_name(path), reader.sample_rate(), config.min_pause_secs);

    let pauses = scan_stream(&mut reader, &mut checker, &mut segmenter, config.frames_per_buffer)
        .map_err(|e| BreathscanError::from_wav(path, "decoding", e))?;

    debug!(path = %path.display(), pauses = pauses.len(), "segmentation complete");
    Ok(pauses)
}

/// The single externally-callable entry point: detection plus severity
/// classification for one file.
pub fn process_one_file(path: &Path, config: &DetectorConfig) -> Result<Vec<BreathingPause>> {
    let pauses = detect_pauses(path, config)?;
    Ok(classify(pauses, &config.thresholds))
}

/// Streams the decoded file through the checker and segmenter.
fn scan_stream(
    reader: &mut WavReader,
    checker: &mut dyn SilenceChecker,
    segmenter: &mut PauseSegmenter,
    frames_per_buffer: usize,
) -> std::result::Result<Vec<BreathingPause>, crate::wav::WavError> {
    let channels = usize::from(reader.num_channels());
    let mut buffer = vec![0f64; frames_per_buffer * channels];
    let mut pauses = Vec::new();

    loop {
        let frames_read = reader.read_frames(&mut buffer, frames_per_buffer)?;
        if frames_read == 0 {
            break;
        }
        let silent = checker.is_silence(&buffer[..frames_read * channels]);
        if let Some(pause) = segmenter.advance(silent, frames_read as u64) {
            debug!(
                index = pause.index,
                start = pause.start_secs,
                end = pause.end_secs,
                "pause detected"
            );
            pauses.push(pause);
        }
    }

    if let Some(pause) = segmenter.finish() {
        debug!(
            index = pause.index,
            start = pause.start_secs,
            end = pause.end_secs,
            "trailing pause flushed"
        );
        pauses.push(pause);
    }

    Ok(pauses)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
