//! Deterministic synthetic pyramids for demos, tests and benchmarks.
//!
//! Models an EDM arrangement (intro, build-up, drop, breakdown, second
//! drop, outro) with beat transients, at any band count, without
//! decoding audio or running the analyzer.

use std::f32::consts::PI;

use super::builder::{length_in_pixels, BuildConfig};
use super::types::{WaveformBandConfig, WaveformLod, WaveformPyramid};

/// Build a synthetic pyramid using the level rules of `config`.
pub fn synthetic_pyramid(
    duration_secs: f32,
    sample_rate: u32,
    bpm: f32,
    band_count: usize,
    config: &BuildConfig,
) -> WaveformPyramid {
    let total_samples = (duration_secs.max(0.0) * sample_rate as f32) as u64;
    let band_count = band_count.max(1);

    let lods = config
        .levels_for(total_samples)
        .into_iter()
        .map(|spp| synthetic_level(spp, total_samples, sample_rate, bpm, band_count))
        .collect();

    WaveformPyramid {
        total_samples,
        sample_rate,
        bands: WaveformBandConfig::new(band_count, sample_rate),
        lods,
    }
}

fn synthetic_level(
    samples_per_pixel: u32,
    total_samples: u64,
    sample_rate: u32,
    bpm: f32,
    band_count: usize,
) -> WaveformLod {
    let length = length_in_pixels(total_samples, samples_per_pixel);
    let samples_per_beat = (sample_rate as f32 * 60.0 / bpm.max(1.0)).max(1.0);

    let mut amplitude = Vec::with_capacity(length * 2);
    let mut band_energies = Vec::with_capacity(length * band_count);

    for pixel in 0..length {
        let position = pixel as f32 * samples_per_pixel as f32;
        let beat_phase = (position % samples_per_beat) / samples_per_beat;

        let level = if (position as u64) < total_samples {
            let progress = position / total_samples.max(1) as f32;
            section_level(progress, beat_phase, pixel)
        } else {
            0.0
        };
        amplitude.push(level);
        amplitude.push(level);

        push_bands(&mut band_energies, beat_phase, band_count);
    }

    WaveformLod {
        samples_per_pixel,
        length_in_pixels: length,
        amplitude,
        band_energies,
    }
}

fn section_level(progress: f32, beat_phase: f32, pixel: usize) -> f32 {
    let section = if progress < 0.05 {
        progress / 0.05
    } else if progress < 0.25 {
        0.6 + (progress - 0.05) * 2.0
    } else if progress < 0.5 {
        1.0
    } else if progress < 0.6 {
        0.4
    } else if progress < 0.85 {
        1.0
    } else {
        (1.0 - (progress - 0.85) / 0.15).max(0.0)
    };

    let transient = 0.3 * (1.0 - beat_phase * 8.0).max(0.0).powi(2);
    let ripple = ((pixel as f32 * 0.1).sin() * 0.5 + 0.5) * 0.1;

    (section * 0.8 + transient + ripple).clamp(0.0, 1.0)
}

fn push_bands(out: &mut Vec<f32>, beat_phase: f32, band_count: usize) {
    // Kick on the downbeat, mids on the off-beat, hats on eighths
    let low = (1.0 - beat_phase * 4.0).max(0.0).powi(2) * 0.9;
    let mid = (beat_phase * 2.0 * PI).sin().powi(2) * 0.7;
    let high = (beat_phase * 4.0 * PI * 2.0).sin().max(0.0).powi(3) * 0.8;

    match band_count {
        1 => out.push((low + mid + high) / 3.0),
        2 => out.extend_from_slice(&[low, high]),
        _ => {
            out.extend_from_slice(&[low, mid, high]);
            for band in 3..band_count {
                let phase = (beat_phase * (band + 1) as f32) % 1.0;
                out.push((phase * PI).sin() * 0.5);
            }
        }
    }
}
