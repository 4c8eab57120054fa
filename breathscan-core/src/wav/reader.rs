//! Streaming WAV frame decoder.
//!
//! ## Normalization
//!
//! Depths above 8 bits are signed: `normalized = raw / 2^(depth-1)`.
//! Depths of 8 bits or less are unsigned: `normalized = raw / (0.5 * (2^depth - 1)) - 1`.
//! Samples are assembled little-endian, and only the most significant byte
//! is sign-extended (unless the sample is a single byte, which is unsigned).

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::WavError;

const RIFF_MARKER: &[u8; 4] = b"RIFF";
const WAVE_MARKER: &[u8; 4] = b"WAVE";
const FMT_TAG: &[u8; 4] = b"fmt ";
const DATA_TAG: &[u8; 4] = b"data";

/// Bytes of the format block consumed for PCM; anything beyond is skipped.
const FMT_BLOCK_LEN: usize = 16;

/// Read-side buffer capacity, amortizing per-sample byte assembly.
const READ_BUF_CAPACITY: usize = 4096;

/// Exclusively owned handle over an open WAV resource, positioned at the
/// start of sample data after a successful `open`.
///
/// The underlying file handle is released when the reader is dropped, on
/// every exit path including parse failure mid-`open`.
#[derive(Debug)]
pub struct WavReader {
    reader: BufReader<File>,
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    valid_bits: u16,
    bytes_per_sample: u16,
    num_frames: u64,
    frames_decoded: u64,
    float_scale: f64,
    float_offset: f64,
}

impl WavReader {
    /// Opens a WAV file, validates the container, and locates the format
    /// and data chunks.
    ///
    /// # Errors
    /// - `WavError::Io` when the file cannot be opened or read.
    /// - `WavError::HeaderMismatch` for a wrong RIFF/WAVE marker or a
    ///   declared size that disagrees with the file length.
    /// - The remaining variants for malformed or unsupported chunks.
    pub fn open(path: &Path) -> Result<Self, WavError> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::with_capacity(READ_BUF_CAPACITY, file);

        read_riff_header(&mut reader, file_len)?;

        let mut format: Option<FormatBlock> = None;

        // Walk the chunk list until the data chunk is found.
        loop {
            let mut header = [0u8; 8];
            if let Err(e) = reader.read_exact(&mut header) {
                return Err(match e.kind() {
                    ErrorKind::UnexpectedEof => WavError::MissingDataChunk,
                    _ => WavError::Io(e),
                });
            }

            let tag = [header[0], header[1], header[2], header[3]];
            let chunk_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
            let aligned_size = word_aligned(chunk_size);

            if &tag == FMT_TAG {
                format = Some(read_format_block(&mut reader, aligned_size)?);
            } else if &tag == DATA_TAG {
                let fmt = format.ok_or(WavError::DataBeforeFormat)?;
                if chunk_size % u32::from(fmt.block_align) != 0 {
                    return Err(WavError::MisalignedData {
                        size: chunk_size,
                        block_align: fmt.block_align,
                    });
                }
                let num_frames = u64::from(chunk_size) / u64::from(fmt.block_align);

                // Scale/offset for int -> normalized float conversion.
                let (float_offset, float_scale) = if fmt.valid_bits > 8 {
                    (0.0, (1u64 << (fmt.valid_bits - 1)) as f64)
                } else {
                    (-1.0, 0.5 * ((1u64 << fmt.valid_bits) - 1) as f64)
                };

                return Ok(Self {
                    reader,
                    num_channels: fmt.num_channels,
                    sample_rate: fmt.sample_rate,
                    block_align: fmt.block_align,
                    valid_bits: fmt.valid_bits,
                    bytes_per_sample: fmt.bytes_per_sample,
                    num_frames,
                    frames_decoded: 0,
                    float_scale,
                    float_offset,
                });
            } else {
                // Unknown chunk: skip its word-aligned payload.
                reader.seek_relative(i64::from(aligned_size))?;
            }
        }
    }

    /// Decodes up to `max_frames` interleaved frames into `buffer` as
    /// normalized f64 samples, nominally in `[-1.0, 1.0]`.
    ///
    /// Returns the number of frames decoded: fewer than requested at
    /// end-of-data, and 0 once the stream is exhausted. `buffer` must hold
    /// at least `max_frames * num_channels` samples; a smaller buffer
    /// lowers the effective frame count instead of panicking.
    ///
    /// # Errors
    /// `WavError::TruncatedData` when the data chunk ends mid-sample,
    /// `WavError::Io` for any other read failure.
    pub fn read_frames(&mut self, buffer: &mut [f64], max_frames: usize) -> Result<usize, WavError> {
        let channels = usize::from(self.num_channels);
        let max_frames = max_frames.min(buffer.len() / channels);

        let mut idx = 0;
        for frame in 0..max_frames {
            if self.frames_decoded == self.num_frames {
                return Ok(frame);
            }
            for _ in 0..channels {
                let raw = self.read_sample()?;
                buffer[idx] = self.float_offset + raw as f64 / self.float_scale;
                idx += 1;
            }
            self.frames_decoded += 1;
        }
        Ok(max_frames)
    }

    /// Assembles one sample from its little-endian byte sequence.
    ///
    /// The most significant byte is sign-extended only for multi-byte
    /// samples; single-byte samples are unsigned.
    fn read_sample(&mut self) -> Result<i64, WavError> {
        let n = usize::from(self.bytes_per_sample);
        let mut bytes = [0u8; 8];
        self.reader
            .read_exact(&mut bytes[..n])
            .map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => WavError::TruncatedData,
                _ => WavError::Io(e),
            })?;

        let mut val: i64 = 0;
        for (i, &byte) in bytes[..n].iter().enumerate() {
            let v: i64 = if i < n - 1 || n == 1 {
                i64::from(byte)
            } else {
                i64::from(byte as i8)
            };
            val += v << (8 * i);
        }
        Ok(val)
    }

    /// Explicitly releases the underlying file handle.
    ///
    /// Dropping the reader has the same effect; this exists for callers
    /// that want the release to be visible in the control flow.
    pub fn close(self) {}

    pub fn num_channels(&self) -> u16 {
        self.num_channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    pub fn valid_bits(&self) -> u16 {
        self.valid_bits
    }

    pub fn bytes_per_sample(&self) -> u16 {
        self.bytes_per_sample
    }

    /// Total frame count declared by the data chunk.
    pub fn num_frames(&self) -> u64 {
        self.num_frames
    }

    /// Frames decoded so far; advances monotonically.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }
}

#[derive(Clone, Copy)]
struct FormatBlock {
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    valid_bits: u16,
    bytes_per_sample: u16,
}

/// Chunk payloads are word aligned: odd sizes occupy one extra byte.
fn word_aligned(size: u32) -> u32 {
    size + (size & 1)
}

fn read_riff_header(reader: &mut BufReader<File>, file_len: u64) -> Result<(), WavError> {
    let mut header = [0u8; 12];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => WavError::HeaderMismatch("file too short for RIFF header".into()),
        _ => WavError::Io(e),
    })?;

    if &header[..4] != RIFF_MARKER {
        return Err(WavError::HeaderMismatch("incorrect RIFF chunk marker".into()));
    }
    if &header[8..12] != WAVE_MARKER {
        return Err(WavError::HeaderMismatch("incorrect WAVE form marker".into()));
    }

    let declared = u32::from_le_bytes(header[4..8].try_into().expect("slice of fixed length"));
    if u64::from(declared) + 8 != file_len {
        return Err(WavError::HeaderMismatch(format!(
            "declared container size {declared} does not match file size {file_len}"
        )));
    }
    Ok(())
}

fn read_format_block(reader: &mut BufReader<File>, aligned_size: u32) -> Result<FormatBlock, WavError> {
    let mut block = [0u8; FMT_BLOCK_LEN];
    reader.read_exact(&mut block).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => WavError::TruncatedChunk("format"),
        _ => WavError::Io(e),
    })?;

    let compression = u16::from_le_bytes([block[0], block[1]]);
    if compression != 1 {
        return Err(WavError::UnsupportedCompression(compression));
    }

    let num_channels = u16::from_le_bytes([block[2], block[3]]);
    let sample_rate = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);
    let block_align = u16::from_le_bytes([block[12], block[13]]);
    let valid_bits = u16::from_le_bytes([block[14], block[15]]);

    if num_channels == 0 {
        return Err(WavError::ZeroChannels);
    }
    if block_align == 0 {
        return Err(WavError::ZeroBlockAlign);
    }
    if !(2..=64).contains(&valid_bits) {
        return Err(WavError::InvalidBitDepth(valid_bits));
    }

    let bytes_per_sample = valid_bits.div_ceil(8);
    if bytes_per_sample * num_channels != block_align {
        return Err(WavError::FormatInconsistency {
            block_align,
            channels: num_channels,
            bytes_per_sample,
        });
    }

    // Skip extension bytes past the 16 consumed (e.g. an 18-byte fmt).
    let trailing = i64::from(aligned_size) - FMT_BLOCK_LEN as i64;
    if trailing > 0 {
        reader.seek_relative(trailing)?;
    }

    Ok(FormatBlock {
        num_channels,
        sample_rate,
        block_align,
        valid_bits,
        bytes_per_sample,
    })
}
