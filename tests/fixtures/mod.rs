//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use deck_waveform::{synthetic_pyramid, BuildConfig, GpuContext, WaveformPyramid};

pub const SAMPLE_RATE: u32 = 44100;

/// GPU context, or `None` on machines without an adapter.
pub async fn gpu() -> Option<GpuContext> {
    GpuContext::new().await.ok()
}

/// One minute at 128 BPM with three bands.
pub fn minute_pyramid() -> Arc<WaveformPyramid> {
    Arc::new(synthetic_pyramid(
        60.0,
        SAMPLE_RATE,
        128.0,
        3,
        &BuildConfig::default(),
    ))
}

pub fn pyramid_secs(seconds: f32) -> Arc<WaveformPyramid> {
    Arc::new(synthetic_pyramid(
        seconds,
        SAMPLE_RATE,
        128.0,
        3,
        &BuildConfig::default(),
    ))
}

/// Write interleaved f32 samples as a 16-bit PCM WAV file.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> std::io::Result<()> {
    let bytes_per_sample = 2u16;
    let data_len = (samples.len() * bytes_per_sample as usize) as u32;
    let block_align = channels * bytes_per_sample;
    let byte_rate = sample_rate * block_align as u32;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&(bytes_per_sample * 8).to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }

    std::fs::File::create(path)?.write_all(&out)
}

/// RGBA pixel at `(x, y)` of a tightly packed image.
pub fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}
