use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::wav::WavError;

/// All errors produced by breathscan-core.
///
/// Every variant carries the identity of the file whose pipeline failed;
/// a failure in one file never affects any other file's pipeline.
#[derive(Debug, Error)]
pub enum BreathscanError {
    #[error("malformed audio container {path}: {source}")]
    MalformedContainer { path: PathBuf, source: WavError },

    #[error("I/O failure while {stage} {path}: {source}")]
    StreamIo {
        path: PathBuf,
        stage: &'static str,
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BreathscanError>;

impl BreathscanError {
    /// Wraps a decoder error with the file it came from and the pipeline
    /// stage that hit it. Plain I/O errors after a successful open are kept
    /// distinct from container-format errors.
    pub(crate) fn from_wav(path: &Path, stage: &'static str, err: WavError) -> Self {
        match err {
            WavError::Io(source) => BreathscanError::StreamIo {
                path: path.to_path_buf(),
                stage,
                source,
            },
            source => BreathscanError::MalformedContainer {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
