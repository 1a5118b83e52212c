//! Renderer configuration: visual knobs, display layout and zoom limits.
//!
//! All structs are plain values. Updates go through `with_*` methods or
//! [`WaveformKnobs::merged`], which return a modified copy.

use serde::{Deserialize, Serialize};

/// Errors raised when validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("Samples-per-pixel ladder is empty")]
    EmptyLadder,
    #[error("Samples-per-pixel ladder must be positive and strictly increasing (entry {index})")]
    UnsortedLadder { index: usize },
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

/// Upper bound for every knob.
pub const MAX_KNOB_VALUE: f32 = 4.0;

/// Visual knob state, 1.0 = neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformKnobs {
    pub gain: f32,
    pub low_gain: f32,
    pub mid_gain: f32,
    pub high_gain: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Default for WaveformKnobs {
    fn default() -> Self {
        Self {
            gain: 1.0,
            low_gain: 1.0,
            mid_gain: 1.0,
            high_gain: 1.0,
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
        }
    }
}

/// Partial knob update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnobUpdate {
    pub gain: Option<f32>,
    pub low_gain: Option<f32>,
    pub mid_gain: Option<f32>,
    pub high_gain: Option<f32>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
}

impl WaveformKnobs {
    pub fn with_gain(mut self, value: f32) -> Self {
        self.gain = value;
        self
    }

    pub fn with_band_gains(mut self, low: f32, mid: f32, high: f32) -> Self {
        self.low_gain = low;
        self.mid_gain = mid;
        self.high_gain = high;
        self
    }

    pub fn with_brightness(mut self, value: f32) -> Self {
        self.brightness = value;
        self
    }

    pub fn with_contrast(mut self, value: f32) -> Self {
        self.contrast = value;
        self
    }

    pub fn with_saturation(mut self, value: f32) -> Self {
        self.saturation = value;
        self
    }

    /// Apply a partial update to a copy.
    pub fn merged(&self, update: &KnobUpdate) -> Self {
        Self {
            gain: update.gain.unwrap_or(self.gain),
            low_gain: update.low_gain.unwrap_or(self.low_gain),
            mid_gain: update.mid_gain.unwrap_or(self.mid_gain),
            high_gain: update.high_gain.unwrap_or(self.high_gain),
            brightness: update.brightness.unwrap_or(self.brightness),
            contrast: update.contrast.unwrap_or(self.contrast),
            saturation: update.saturation.unwrap_or(self.saturation),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = MAX_KNOB_VALUE as f64;
        check_range("gain", self.gain as f64, 0.0, max)?;
        check_range("low_gain", self.low_gain as f64, 0.0, max)?;
        check_range("mid_gain", self.mid_gain as f64, 0.0, max)?;
        check_range("high_gain", self.high_gain as f64, 0.0, max)?;
        check_range("brightness", self.brightness as f64, 0.0, max)?;
        check_range("contrast", self.contrast as f64, 0.0, max)?;
        check_range("saturation", self.saturation as f64, 0.0, max)
    }
}

/// Texture filtering used when sampling waveform levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerFilter {
    Nearest,
    #[default]
    Linear,
}

impl SamplerFilter {
    pub fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            SamplerFilter::Nearest => wgpu::FilterMode::Nearest,
            SamplerFilter::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Layout and overlay settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Vertical center of the waveform, 0..1 of the view height.
    pub center_y: f32,
    /// Half-height of the tallest peak, 0..1 of the view height.
    pub max_height: f32,
    pub clear_color: [f32; 3],
    pub filter: SamplerFilter,
    pub show_beat_grid: bool,
    pub show_loop_region: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            center_y: 0.5,
            max_height: 0.4,
            clear_color: [0.05, 0.05, 0.08],
            filter: SamplerFilter::Linear,
            show_beat_grid: true,
            show_loop_region: true,
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("center_y", self.center_y as f64, 0.0, 1.0)?;
        check_range("max_height", self.max_height as f64, 0.0, 1.0)?;
        for c in self.clear_color {
            check_range("clear_color", c as f64, 0.0, 1.0)?;
        }
        Ok(())
    }
}

/// Allowed zoom factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 0.01, max: 100.0 }
    }
}

impl ZoomRange {
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("zoom.min", self.min, f64::MIN_POSITIVE, f64::MAX)?;
        check_range("zoom.max", self.max, self.min, f64::MAX)
    }
}

/// Complete renderer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub knobs: WaveformKnobs,
    pub display: DisplayConfig,
    pub zoom: ZoomRange,
    pub initial_zoom: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            knobs: WaveformKnobs::default(),
            display: DisplayConfig::default(),
            zoom: ZoomRange::default(),
            initial_zoom: 1.0,
        }
    }
}

impl RendererConfig {
    pub fn with_knobs(mut self, knobs: WaveformKnobs) -> Self {
        self.knobs = knobs;
        self
    }

    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    pub fn with_zoom_range(mut self, min: f64, max: f64) -> Self {
        self.zoom = ZoomRange { min, max };
        self
    }

    pub fn with_initial_zoom(mut self, zoom: f64) -> Self {
        self.initial_zoom = zoom;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.knobs.validate()?;
        self.display.validate()?;
        self.zoom.validate()?;
        check_range("initial_zoom", self.initial_zoom, self.zoom.min, self.zoom.max)
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
