//! Waveform data model: band configuration, detail levels, pyramids and
//! the per-deck transport snapshot pushed in by the playback engine.

use serde::{Deserialize, Serialize};

/// Shape or ordering problems detected before a pyramid reaches the GPU.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WaveformError {
    #[error("Pyramid has no detail levels")]
    EmptyPyramid,
    #[error("Band count must be at least 1")]
    InvalidBandCount,
    #[error("Level {lod}: samples per pixel must be > 0")]
    InvalidSamplesPerPixel { lod: usize },
    #[error("Level {index} is not coarser than the level before it")]
    UnsortedLevels { index: usize },
    #[error("Level {lod}: {field} has {actual} values, expected {expected}")]
    DataShape {
        lod: usize,
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Inclusive-exclusive frequency span covered by one band, in Hz.
/// Descriptive only; nothing in the render path reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub min: f32,
    pub max: f32,
}

/// Band layout shared by every level of a pyramid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformBandConfig {
    pub band_count: usize,
    pub sample_rate: u32,
    #[serde(default)]
    pub frequency_ranges: Vec<FrequencyRange>,
}

impl WaveformBandConfig {
    pub fn new(band_count: usize, sample_rate: u32) -> Self {
        Self {
            band_count,
            sample_rate,
            frequency_ranges: Vec::new(),
        }
    }

    pub fn with_frequency_ranges(mut self, ranges: Vec<FrequencyRange>) -> Self {
        self.frequency_ranges = ranges;
        self
    }
}

/// One precomputed level of detail.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformLod {
    /// Audio samples aggregated into one column.
    pub samples_per_pixel: u32,
    /// Number of columns, `ceil(total_samples / samples_per_pixel)`.
    pub length_in_pixels: usize,
    /// Interleaved `[min0, max0, min1, max1, ...]`, `min` stored as a magnitude.
    pub amplitude: Vec<f32>,
    /// Interleaved by pixel: `[b0_p0, b1_p0, ..., b0_p1, ...]`.
    pub band_energies: Vec<f32>,
}

impl WaveformLod {
    /// Check the amplitude and band arrays against the declared dimensions.
    pub fn validate(&self, index: usize, band_count: usize) -> Result<(), WaveformError> {
        if self.samples_per_pixel == 0 {
            return Err(WaveformError::InvalidSamplesPerPixel { lod: index });
        }

        let expected_amplitude = self.length_in_pixels * 2;
        if self.amplitude.len() != expected_amplitude {
            return Err(WaveformError::DataShape {
                lod: index,
                field: "amplitude",
                expected: expected_amplitude,
                actual: self.amplitude.len(),
            });
        }

        let expected_bands = self.length_in_pixels * band_count;
        if self.band_energies.len() != expected_bands {
            return Err(WaveformError::DataShape {
                lod: index,
                field: "band_energies",
                expected: expected_bands,
                actual: self.band_energies.len(),
            });
        }

        Ok(())
    }

    /// `(min_magnitude, max)` for one column.
    pub fn amplitude_at(&self, pixel: usize) -> Option<(f32, f32)> {
        let min = *self.amplitude.get(pixel * 2)?;
        let max = *self.amplitude.get(pixel * 2 + 1)?;
        Some((min, max))
    }

    /// Band energies for one column.
    pub fn bands_at(&self, pixel: usize, band_count: usize) -> Option<&[f32]> {
        let start = pixel * band_count;
        self.band_energies.get(start..start + band_count)
    }
}

/// Multi-resolution waveform for one track, ordered fine to coarse.
///
/// Built once per track load and never mutated afterwards; render
/// components share it through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformPyramid {
    pub total_samples: u64,
    pub sample_rate: u32,
    pub bands: WaveformBandConfig,
    pub lods: Vec<WaveformLod>,
}

impl WaveformPyramid {
    /// Reject anything that would upload a corrupted waveform.
    pub fn validate(&self) -> Result<(), WaveformError> {
        if self.bands.band_count == 0 {
            return Err(WaveformError::InvalidBandCount);
        }
        if self.lods.is_empty() {
            return Err(WaveformError::EmptyPyramid);
        }

        for (index, lod) in self.lods.iter().enumerate() {
            lod.validate(index, self.bands.band_count)?;
            if index > 0 && lod.samples_per_pixel <= self.lods[index - 1].samples_per_pixel {
                return Err(WaveformError::UnsortedLevels { index });
            }
        }

        Ok(())
    }

    pub fn band_count(&self) -> usize {
        self.bands.band_count
    }

    /// Track duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.total_samples as f64 / self.sample_rate as f64
    }

    pub fn finest(&self) -> Option<&WaveformLod> {
        self.lods.first()
    }

    pub fn overview(&self) -> Option<&WaveformLod> {
        self.lods.last()
    }
}

/// Transport snapshot for one deck, produced by the playback engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckTransportState {
    /// Position in samples. Routinely exceeds the f32 mantissa range.
    pub playhead_samples: f64,
    pub rate: f64,
    pub bpm: f64,
    /// Beat-grid phase in `[0, 1)`.
    pub beat_phase_offset: f64,
}

impl Default for DeckTransportState {
    fn default() -> Self {
        Self {
            playhead_samples: 0.0,
            rate: 1.0,
            bpm: 128.0,
            beat_phase_offset: 0.0,
        }
    }
}

impl DeckTransportState {
    /// Replace non-finite fields and wrap the beat phase into `[0, 1)`.
    pub fn sanitized(self) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        let phase = finite_or(self.beat_phase_offset, 0.0).rem_euclid(1.0);
        Self {
            playhead_samples: finite_or(self.playhead_samples, 0.0).max(0.0),
            rate: finite_or(self.rate, 1.0),
            bpm: finite_or(self.bpm, 0.0).max(0.0),
            // rem_euclid can round up to exactly 1.0 for tiny negative inputs
            beat_phase_offset: if phase >= 1.0 { 0.0 } else { phase },
        }
    }

    /// Advance by `dt` seconds of playback, wrapping at the end of the track.
    pub fn advanced(self, dt: f64, sample_rate: u32, total_samples: u64) -> Self {
        let mut next = self.playhead_samples + dt * sample_rate as f64 * self.rate;
        if total_samples > 0 {
            next = next.rem_euclid(total_samples as f64);
        }
        Self {
            playhead_samples: next,
            ..self
        }
        .sanitized()
    }

    /// Playhead position in seconds.
    pub fn position_seconds(&self, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.playhead_samples / sample_rate as f64
    }
}

/// Active loop, in samples. `end_samples` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopRegion {
    pub start_samples: f64,
    pub end_samples: f64,
}

impl LoopRegion {
    /// Returns `None` for empty, inverted or non-finite regions.
    pub fn new(start_samples: f64, end_samples: f64) -> Option<Self> {
        if !start_samples.is_finite() || !end_samples.is_finite() {
            return None;
        }
        if start_samples < 0.0 || end_samples <= start_samples {
            return None;
        }
        Some(Self {
            start_samples,
            end_samples,
        })
    }

    pub fn length(&self) -> f64 {
        self.end_samples - self.start_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lod(spp: u32, len: usize, bands: usize) -> WaveformLod {
        WaveformLod {
            samples_per_pixel: spp,
            length_in_pixels: len,
            amplitude: vec![0.5; len * 2],
            band_energies: vec![0.25; len * bands],
        }
    }

    fn pyramid(lods: Vec<WaveformLod>) -> WaveformPyramid {
        WaveformPyramid {
            total_samples: 4096,
            sample_rate: 44100,
            bands: WaveformBandConfig::new(3, 44100),
            lods,
        }
    }

    #[test]
    fn test_valid_pyramid() {
        let p = pyramid(vec![lod(64, 64, 3), lod(128, 32, 3)]);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_amplitude_shape_mismatch_rejected() {
        let mut bad = lod(64, 64, 3);
        bad.amplitude.pop();
        let err = pyramid(vec![bad]).validate().unwrap_err();
        assert_eq!(
            err,
            WaveformError::DataShape {
                lod: 0,
                field: "amplitude",
                expected: 128,
                actual: 127
            }
        );
    }

    #[test]
    fn test_band_shape_mismatch_rejected() {
        let mut bad = lod(128, 32, 3);
        bad.band_energies.extend_from_slice(&[0.0; 3]);
        let err = pyramid(vec![lod(64, 64, 3), bad]).validate().unwrap_err();
        assert!(matches!(
            err,
            WaveformError::DataShape {
                lod: 1,
                field: "band_energies",
                ..
            }
        ));
    }

    #[test]
    fn test_unsorted_levels_rejected() {
        let p = pyramid(vec![lod(128, 32, 3), lod(64, 64, 3)]);
        assert_eq!(p.validate(), Err(WaveformError::UnsortedLevels { index: 1 }));
    }

    #[test]
    fn test_empty_pyramid_rejected() {
        assert_eq!(pyramid(vec![]).validate(), Err(WaveformError::EmptyPyramid));
    }

    #[test]
    fn test_transport_sanitize_wraps_phase() {
        let t = DeckTransportState {
            playhead_samples: f64::NAN,
            rate: 1.0,
            bpm: 128.0,
            beat_phase_offset: -0.25,
        }
        .sanitized();
        assert_eq!(t.playhead_samples, 0.0);
        assert!((t.beat_phase_offset - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_transport_advance_wraps_at_end() {
        let t = DeckTransportState {
            playhead_samples: 44_000.0,
            ..Default::default()
        };
        let next = t.advanced(0.01, 44100, 44_100);
        assert!((next.playhead_samples - 341.0).abs() < 1e-6);
    }

    #[test]
    fn test_loop_region_rejects_inverted() {
        assert!(LoopRegion::new(100.0, 50.0).is_none());
        assert!(LoopRegion::new(100.0, 100.0).is_none());
        assert_eq!(LoopRegion::new(0.0, 10.0).map(|r| r.length()), Some(10.0));
    }
}
