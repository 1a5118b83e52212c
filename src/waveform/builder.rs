//! Offline transform from decoded mono PCM to a [`WaveformPyramid`].

use serde::{Deserialize, Serialize};

use super::types::{FrequencyRange, WaveformBandConfig, WaveformLod, WaveformPyramid};
use crate::audio::analysis::BlockStats;
use crate::config::ConfigError;

/// GPU-safe upper bound for one level's texture width. Most adapters
/// expose `max_texture_dimension_2d >= 8192`.
pub const DEFAULT_MAX_TEXTURE_WIDTH: u32 = 8192;

/// Nominal samples-per-pixel ladder, fine to coarse.
pub const DEFAULT_SAMPLES_PER_PIXEL_LADDER: [u32; 9] =
    [64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384];

/// Bands produced by the heuristic analyzer.
pub const BUILDER_BAND_COUNT: usize = 3;

/// Low / mid / high spans reported in the band config.
pub const BUILDER_FREQUENCY_RANGES: [FrequencyRange; BUILDER_BAND_COUNT] = [
    FrequencyRange { min: 20.0, max: 250.0 },
    FrequencyRange { min: 250.0, max: 4000.0 },
    FrequencyRange { min: 4000.0, max: 20000.0 },
];

/// Settings for pyramid construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Levels wider than this are skipped.
    pub max_texture_width: u32,
    /// Candidate samples-per-pixel values, strictly increasing.
    pub samples_per_pixel_ladder: Vec<u32>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_texture_width: DEFAULT_MAX_TEXTURE_WIDTH,
            samples_per_pixel_ladder: DEFAULT_SAMPLES_PER_PIXEL_LADDER.to_vec(),
        }
    }
}

impl BuildConfig {
    pub fn with_max_texture_width(mut self, width: u32) -> Self {
        self.max_texture_width = width;
        self
    }

    pub fn with_ladder(mut self, ladder: Vec<u32>) -> Self {
        self.samples_per_pixel_ladder = ladder;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_texture_width == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_texture_width",
                value: 0.0,
            });
        }
        if self.samples_per_pixel_ladder.is_empty() {
            return Err(ConfigError::EmptyLadder);
        }
        if self.samples_per_pixel_ladder[0] == 0 {
            return Err(ConfigError::UnsortedLadder { index: 0 });
        }
        for (i, pair) in self.samples_per_pixel_ladder.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigError::UnsortedLadder { index: i + 1 });
            }
        }
        Ok(())
    }

    /// Samples-per-pixel values actually built for a track of this length.
    ///
    /// Keeps ladder entries whose width fits `max_texture_width` and that
    /// still shrink the previous kept level (coarse levels of very short
    /// tracks collapse to the same width and are dropped). If nothing fits,
    /// a single level of `ceil(total / max_width)` samples per pixel is used.
    pub fn levels_for(&self, total_samples: u64) -> Vec<u32> {
        let max_width = self.max_texture_width.max(1) as u64;
        let mut levels = Vec::new();
        let mut last_len: Option<u64> = None;

        for &spp in &self.samples_per_pixel_ladder {
            if spp == 0 {
                continue;
            }
            let len = length_in_pixels(total_samples, spp) as u64;
            if len > max_width {
                continue;
            }
            if last_len.is_some_and(|prev| len >= prev) {
                continue;
            }
            levels.push(spp);
            last_len = Some(len);
        }

        if levels.is_empty() {
            let spp = total_samples.div_ceil(max_width).min(u32::MAX as u64) as u32;
            levels.push(spp.max(1));
        }

        levels
    }
}

/// `ceil(total / spp)`, with an empty track occupying one column.
pub fn length_in_pixels(total_samples: u64, samples_per_pixel: u32) -> usize {
    if samples_per_pixel == 0 {
        return 1;
    }
    (total_samples.div_ceil(samples_per_pixel as u64) as usize).max(1)
}

/// Builds pyramids from mono PCM.
#[derive(Debug, Clone, Default)]
pub struct PyramidBuilder {
    config: BuildConfig,
}

impl PyramidBuilder {
    pub fn new(config: BuildConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build every level from `pcm`.
    ///
    /// Non-finite samples are treated as silence. An empty input yields one
    /// 1-pixel level rather than an error.
    pub fn build(&self, pcm: &[f32], sample_rate: u32) -> WaveformPyramid {
        let total_samples = pcm.len() as u64;
        let bands = WaveformBandConfig::new(BUILDER_BAND_COUNT, sample_rate)
            .with_frequency_ranges(BUILDER_FREQUENCY_RANGES.to_vec());

        let lods: Vec<WaveformLod> = self
            .config
            .levels_for(total_samples)
            .into_iter()
            .map(|spp| build_level(pcm, spp))
            .collect();

        log::debug!(
            "Built waveform pyramid: {} samples @ {} Hz, levels {:?}",
            total_samples,
            sample_rate,
            lods.iter().map(|l| l.samples_per_pixel).collect::<Vec<_>>()
        );

        WaveformPyramid {
            total_samples,
            sample_rate,
            bands,
            lods,
        }
    }
}

/// Build a pyramid with the default configuration.
pub fn build_pyramid(pcm: &[f32], sample_rate: u32) -> WaveformPyramid {
    PyramidBuilder::default().build(pcm, sample_rate)
}

fn build_level(pcm: &[f32], samples_per_pixel: u32) -> WaveformLod {
    let length = length_in_pixels(pcm.len() as u64, samples_per_pixel);
    let mut amplitude = Vec::with_capacity(length * 2);
    let mut band_energies = Vec::with_capacity(length * BUILDER_BAND_COUNT);

    let spp = samples_per_pixel as usize;
    for pixel in 0..length {
        let start = (pixel * spp).min(pcm.len());
        let end = (start + spp).min(pcm.len());
        let stats = BlockStats::measure(&pcm[start..end]);

        let (min, max) = stats.envelope();
        amplitude.push(min);
        amplitude.push(max);
        band_energies.extend_from_slice(&stats.band_energies());
    }

    WaveformLod {
        samples_per_pixel,
        length_in_pixels: length,
        amplitude,
        band_energies,
    }
}
