//! Pause segmentation: turns per-buffer silence flags into pause intervals.
//!
//! A two-state machine driven by `(silent, frames)` events carrying a
//! running frame offset:
//!
//! ```text
//!            flag = true, record offset before buffer
//!   InSound ──────────────────────────────────────────► InSilence
//!           ◄──────────────────────────────────────────
//!            flag = false, emit pause ending after buffer
//! ```
//!
//! A trailing silence at end of stream is flushed by `finish`.

use crate::pause::BreathingPause;

/// Pauses shorter than this are rounding artifacts, not breathing pauses.
pub const DEFAULT_MIN_PAUSE_SECS: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentState {
    InSound,
    InSilence { start_frame: u64 },
}

/// Streaming pause segmenter for one audio file.
#[derive(Debug)]
pub struct PauseSegmenter {
    source: String,
    sample_rate: u32,
    min_pause_secs: f64,
    state: SegmentState,
    frames_seen: u64,
    emitted: u32,
}

impl PauseSegmenter {
    pub fn new(source: impl Into<String>, sample_rate: u32) -> Self {
        Self::with_min_duration(source, sample_rate, DEFAULT_MIN_PAUSE_SECS)
    }

    pub fn with_min_duration(source: impl Into<String>, sample_rate: u32, min_pause_secs: f64) -> Self {
        Self {
            source: source.into(),
            sample_rate,
            min_pause_secs,
            state: SegmentState::InSound,
            frames_seen: 0,
            emitted: 0,
        }
    }

    /// Feeds one buffer's silence decision and frame count.
    ///
    /// Returns a pause when this buffer ends a silence run that lasted
    /// longer than the minimum duration guard. Start offsets are taken
    /// before the buffer that entered silence; end offsets after the
    /// buffer that left it.
    pub fn advance(&mut self, silent: bool, frames: u64) -> Option<BreathingPause> {
        if frames == 0 {
            return None;
        }
        let offset_before = self.frames_seen;
        self.frames_seen += frames;

        match self.state {
            SegmentState::InSound if silent => {
                self.state = SegmentState::InSilence {
                    start_frame: offset_before,
                };
                None
            }
            SegmentState::InSilence { start_frame } if !silent => {
                self.state = SegmentState::InSound;
                self.emit(start_frame, self.frames_seen)
            }
            _ => None,
        }
    }

    /// Flushes a trailing pause when the stream ends while still silent.
    pub fn finish(&mut self) -> Option<BreathingPause> {
        match self.state {
            SegmentState::InSilence { start_frame } => {
                self.state = SegmentState::InSound;
                self.emit(start_frame, self.frames_seen)
            }
            SegmentState::InSound => None,
        }
    }

    /// Pauses emitted so far for this file.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }

    fn emit(&mut self, start_frame: u64, end_frame: u64) -> Option<BreathingPause> {
        let rate = f64::from(self.sample_rate);
        let duration = (end_frame - start_frame) as f64 / rate;
        if duration <= self.min_pause_secs {
            return None;
        }
        self.emitted += 1;
        Some(BreathingPause::new(
            self.source.clone(),
            self.emitted,
            start_frame as f64 / rate,
            end_frame as f64 / rate,
        ))
    }
}
