//! RIFF/WAVE container parsing and PCM frame decoding.
//!
//! Only uncompressed linear PCM is supported. The parser walks the chunk
//! list manually (4-byte ASCII tag + little-endian u32 size, sizes rounded
//! up to even for word alignment) rather than trusting a generic decoder,
//! because the downstream detector depends on the exact sign-extension and
//! normalization rules of the format block.

pub mod reader;

pub use reader::WavReader;

use thiserror::Error;

/// Errors raised while parsing a WAV container or decoding its samples.
#[derive(Debug, Error)]
pub enum WavError {
    /// The 12-byte RIFF/WAVE preamble is missing, carries the wrong
    /// markers, or declares a container size that disagrees with the file.
    #[error("invalid WAV header: {0}")]
    HeaderMismatch(String),

    #[error("compression code {0} is not supported (only uncompressed PCM)")]
    UnsupportedCompression(u16),

    #[error(
        "block align {block_align} does not match {channels} channel(s) \
         at {bytes_per_sample} byte(s) per sample"
    )]
    FormatInconsistency {
        block_align: u16,
        channels: u16,
        bytes_per_sample: u16,
    },

    #[error("data chunk found before format chunk")]
    DataBeforeFormat,

    #[error("data chunk size {size} is not a multiple of block align {block_align}")]
    MisalignedData { size: u32, block_align: u16 },

    #[error("file ended before a data chunk was found")]
    MissingDataChunk,

    #[error("truncated {0} chunk")]
    TruncatedChunk(&'static str),

    #[error("channel count in format chunk is zero")]
    ZeroChannels,

    #[error("block align in format chunk is zero")]
    ZeroBlockAlign,

    #[error("valid bits {0} outside the supported 2..=64 range")]
    InvalidBitDepth(u16),

    #[error("unexpected end of data while decoding samples")]
    TruncatedData,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
