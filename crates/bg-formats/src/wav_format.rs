//! WAV encoding for 16-bit stereo PCM.

use bg_engine::Frame;
use std::io::Write;

use crate::FormatError;

const CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * (BITS_PER_SAMPLE / 8);
const HEADER_LEN: usize = 44;

/// Most frames one WAV file can hold: the RIFF size field is 32-bit.
pub const MAX_WAV_FRAMES: usize = ((u32::MAX - 36) / BLOCK_ALIGN as u32) as usize;

/// Write `frames` as a complete WAV file.
pub fn write_wav(w: &mut impl Write, frames: &[Frame], sample_rate: u32) -> Result<(), FormatError> {
    w.write_all(&frames_to_wav(frames, sample_rate)?)?;
    Ok(())
}

/// Encode `frames` as WAV bytes.
pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Result<Vec<u8>, FormatError> {
    let header = wav_header(frames.len(), sample_rate)?;
    let mut buf = Vec::with_capacity(HEADER_LEN + frames.len() * BLOCK_ALIGN as usize);
    buf.extend_from_slice(&header);
    for frame in frames {
        buf.extend_from_slice(&frame.left.to_le_bytes());
        buf.extend_from_slice(&frame.right.to_le_bytes());
    }
    Ok(buf)
}

fn wav_header(frame_count: usize, sample_rate: u32) -> Result<[u8; HEADER_LEN], FormatError> {
    if frame_count > MAX_WAV_FRAMES {
        return Err(FormatError::WavTooLong { frames: frame_count });
    }
    let data_size = frame_count as u32 * BLOCK_ALIGN as u32;
    let byte_rate = sample_rate
        .checked_mul(BLOCK_ALIGN as u32)
        .ok_or(FormatError::SampleRateTooHigh(sample_rate))?;

    let mut header = [0u8; HEADER_LEN];
    let fields: [&[u8]; 13] = [
        b"RIFF",
        &(36 + data_size).to_le_bytes(),
        b"WAVE",
        b"fmt ",
        &16u32.to_le_bytes(),
        &1u16.to_le_bytes(), // PCM
        &CHANNELS.to_le_bytes(),
        &sample_rate.to_le_bytes(),
        &byte_rate.to_le_bytes(),
        &BLOCK_ALIGN.to_le_bytes(),
        &BITS_PER_SAMPLE.to_le_bytes(),
        b"data",
        &data_size.to_le_bytes(),
    ];
    let mut at = 0;
    for field in fields {
        header[at..at + field.len()].copy_from_slice(field);
        at += field.len();
    }
    Ok(header)
}
