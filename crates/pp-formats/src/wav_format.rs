//! WAV decoding for sample loading.
//!
//! Only the first channel is kept; samples are mono. Integer PCM (8, 16,
//! 24 and 32 bit) and 32-bit float are normalised to [-1, 1].

use pp_ir::{AudioSource, SampleProvider};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::FormatError;

const FORMAT_PCM: u16 = 1;
const FORMAT_FLOAT: u16 = 3;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// A decoded recording: the first channel as f32 frames.
#[derive(Clone, Debug, PartialEq)]
pub struct WavFile {
    pub sample_rate: u32,
    /// Channel count of the file (only channel 0 is decoded).
    pub channels: u16,
    frames: Vec<f32>,
}

impl WavFile {
    pub fn frames(&self) -> &[f32] {
        &self.frames
    }
}

impl AudioSource for WavFile {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn frames(&self) -> usize {
        self.frames.len()
    }

    fn read_f32(&self, frame: usize) -> f32 {
        self.frames.get(frame).copied().unwrap_or(0.0)
    }
}

/// Opens WAV files relative to a root directory.
#[derive(Clone, Debug)]
pub struct WavProvider {
    root: PathBuf,
}

impl WavProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SampleProvider for WavProvider {
    type Source = WavFile;
    type Error = FormatError;

    fn open(&self, path: &str) -> Result<WavFile, FormatError> {
        let full = self.root.join(path);
        let data = std::fs::read(&full).map_err(|source| FormatError::Io { path: full.clone(), source })?;
        let wav = parse_wav(&data)?;
        debug!(path = %full.display(), frames = wav.frames.len(), sample_rate = wav.sample_rate, "decoded wav");
        Ok(wav)
    }
}

/// Decode a WAV file from raw bytes.
pub fn parse_wav(data: &[u8]) -> Result<WavFile, FormatError> {
    let header = parse_header(data)?;
    let end = (header.data_offset + header.data_size).min(data.len());
    let raw = &data[header.data_offset..end];
    let frames = decode_channel0(raw, &header);
    Ok(WavFile { sample_rate: header.sample_rate, channels: header.num_channels, frames })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Encoding {
    Int,
    Float,
}

struct WavHeader {
    encoding: Encoding,
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    data_offset: usize,
    data_size: usize,
}

fn parse_header(data: &[u8]) -> Result<WavHeader, FormatError> {
    if data.len() < 12 {
        return Err(FormatError::UnexpectedEof);
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(FormatError::InvalidHeader);
    }

    let mut pos = 12;
    let mut fmt: Option<(u16, u16, u32, u16)> = None;
    let mut data_chunk: Option<(usize, usize)> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32_le(data, pos + 4) as usize;
        let body = pos + 8;

        if chunk_id == b"fmt " {
            if chunk_size < 16 || body + 16 > data.len() {
                return Err(FormatError::UnexpectedEof);
            }
            let mut format = read_u16_le(data, body);
            let channels = read_u16_le(data, body + 2);
            let rate = read_u32_le(data, body + 4);
            let bits = read_u16_le(data, body + 14);
            if format == FORMAT_EXTENSIBLE {
                // Subformat GUID starts 24 bytes into the chunk; its first
                // two bytes carry the plain format tag.
                if chunk_size < 26 || body + 26 > data.len() {
                    return Err(FormatError::UnexpectedEof);
                }
                format = read_u16_le(data, body + 24);
            }
            fmt = Some((format, channels, rate, bits));
        } else if chunk_id == b"data" {
            data_chunk = Some((body, chunk_size));
        }

        pos = body.saturating_add(chunk_size);
        if pos % 2 != 0 {
            pos += 1;
        }
    }

    let (format, num_channels, sample_rate, bits_per_sample) = fmt.ok_or(FormatError::InvalidHeader)?;
    let (data_offset, data_size) = data_chunk.ok_or(FormatError::UnexpectedEof)?;

    let encoding = match (format, bits_per_sample) {
        (FORMAT_PCM, 8 | 16 | 24 | 32) => Encoding::Int,
        (FORMAT_FLOAT, 32) => Encoding::Float,
        (f, b) => return Err(FormatError::UnsupportedFormat(format!("format tag {} with {} bits", f, b))),
    };
    if num_channels == 0 {
        return Err(FormatError::UnsupportedFormat("zero channels".into()));
    }
    if sample_rate == 0 {
        return Err(FormatError::UnsupportedFormat("zero sample rate".into()));
    }

    Ok(WavHeader { encoding, num_channels, sample_rate, bits_per_sample, data_offset, data_size })
}

/// Decode the first channel of every complete frame.
fn decode_channel0(raw: &[u8], header: &WavHeader) -> Vec<f32> {
    let bytes = (header.bits_per_sample / 8) as usize;
    let frame_len = bytes * header.num_channels as usize;
    raw.chunks_exact(frame_len)
        .map(|frame| decode_sample(&frame[..bytes], header.encoding))
        .collect()
}

fn decode_sample(b: &[u8], encoding: Encoding) -> f32 {
    match (encoding, b.len()) {
        // 8-bit WAV is unsigned, centred on 128
        (Encoding::Int, 1) => (b[0] as f32 - 128.0) / 128.0,
        (Encoding::Int, 2) => i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0,
        (Encoding::Int, 3) => {
            let v = i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8;
            v as f32 / 8_388_608.0
        }
        (Encoding::Int, 4) => i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32 / 2_147_483_648.0,
        (Encoding::Float, 4) => f32::from_le_bytes([b[0], b[1], b[2], b[3]]).clamp(-1.0, 1.0),
        _ => 0.0,
    }
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}
