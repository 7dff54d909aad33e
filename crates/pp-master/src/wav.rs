//! WAV encoding for 16-bit stereo PCM.

use pp_engine::StereoFrame;
use std::io::{self, Write};

const CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * (BITS_PER_SAMPLE / 8);
const HEADER_LEN: usize = 44;

/// Fails with `InvalidInput` if the data chunk would not fit a 32-bit RIFF size.
pub fn write_wav(w: &mut impl Write, frames: &[StereoFrame], sample_rate: u32) -> io::Result<()> {
    w.write_all(&header(frames.len(), sample_rate)?)?;
    for frame in frames {
        let (left, right) = frame.to_i16();
        w.write_all(&left.to_le_bytes())?;
        w.write_all(&right.to_le_bytes())?;
    }
    Ok(())
}

pub fn frames_to_wav(frames: &[StereoFrame], sample_rate: u32) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(HEADER_LEN + frames.len() * BLOCK_ALIGN as usize);
    write_wav(&mut buf, frames, sample_rate)?;
    Ok(buf)
}

fn too_large(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("{what} too large for a WAV header"))
}

/// RIFF, fmt and data chunk headers for `frames` stereo frames.
fn header(frames: usize, sample_rate: u32) -> io::Result<[u8; HEADER_LEN]> {
    let data_size = u32::try_from(frames)
        .ok()
        .and_then(|n| n.checked_mul(BLOCK_ALIGN as u32))
        .and_then(|size| size.checked_add(36).map(|_| size))
        .ok_or_else(|| too_large("frame count"))?;
    let byte_rate = sample_rate
        .checked_mul(BLOCK_ALIGN as u32)
        .ok_or_else(|| too_large("sample rate"))?;

    let mut h = [0u8; HEADER_LEN];
    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");
    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes());
    h[20..22].copy_from_slice(&1u16.to_le_bytes());
    h[22..24].copy_from_slice(&CHANNELS.to_le_bytes());
    h[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    h[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    h[32..34].copy_from_slice(&BLOCK_ALIGN.to_le_bytes());
    h[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&data_size.to_le_bytes());
    Ok(h)
}
