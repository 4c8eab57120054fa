//! # breathscan-core
//!
//! Breathing-pause detection engine for recorded WAV audio.
//!
//! ## Architecture
//!
//! ```text
//! WavReader ──frames──► SilenceChecker ──flags──► PauseSegmenter
//!                                                      │
//!                                              Vec<BreathingPause>
//!                                                      │
//!                                            classify(thresholds)
//! ```
//!
//! Each file is processed by one exclusive pipeline: the reader streams
//! fixed-size frame buffers, the detector labels each buffer silent or not,
//! the segmenter turns label transitions into pause intervals, and the
//! classifier grades each pause by duration. Nothing is shared between
//! file pipelines, so a caller may run many of them concurrently.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod classify;
pub mod error;
pub mod pause;
pub mod pipeline;
pub mod segment;
pub mod silence;
pub mod wav;

// Convenience re-exports for downstream crates
pub use classify::{classify, SeverityThresholds};
pub use error::{BreathscanError, Result};
pub use pause::{AnalysisSummary, BreathingPause, PauseReport, Severity};
pub use pipeline::{detect_pauses, process_one_file, DetectorConfig};
pub use segment::PauseSegmenter;
pub use silence::{AdaptiveSilenceChecker, SilenceChecker};
pub use wav::{WavError, WavReader};
