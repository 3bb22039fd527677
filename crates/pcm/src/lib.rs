use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::{BufMut, BytesMut};

mod error;

pub use error::*;

/// Narration clips are generated upstream as 24 kHz mono.
pub const SAMPLE_RATE: u32 = 24_000;
pub const CHANNELS: u16 = 1;

const I16_SCALE: f32 = 32768.0;

/// A decoded, normalized audio clip ready for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SampleBuffer {
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }
}

/// Decode a base64-encoded signed 16-bit little-endian mono PCM payload
/// into normalized f32 samples.
///
/// Normalization divides by 32768.0 for both polarities, so the positive
/// range tops out one step below 1.0. The generation side encodes the same
/// way; do not rescale.
pub fn decode(payload: &str) -> Result<SampleBuffer, Error> {
    let bytes = BASE64.decode(payload)?;

    if bytes.is_empty() {
        return Err(Error::EmptyPayload);
    }
    if bytes.len() % 2 != 0 {
        return Err(Error::TruncatedPayload { len: bytes.len() });
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / I16_SCALE)
        .collect();

    Ok(SampleBuffer {
        samples,
        sample_rate: SAMPLE_RATE,
        channels: CHANNELS,
    })
}

/// Inverse of [`decode`]: clamp, scale back to i16 and base64-encode.
pub fn encode(buffer: &SampleBuffer) -> String {
    let mut bytes = BytesMut::with_capacity(buffer.samples.len() * 2);
    for &sample in &buffer.samples {
        let scaled = (sample * I16_SCALE).clamp(-I16_SCALE, I16_SCALE);
        bytes.put_i16_le(scaled as i16);
    }
    BASE64.encode(&bytes)
}
