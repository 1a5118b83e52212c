//! Waveform data model, pyramid construction and level-of-detail selection.
//!
//! This module provides:
//! - The pyramid data model and its shape validation
//! - Pyramid building from mono PCM (min/max envelope + heuristic bands)
//! - Zoom to samples-per-pixel mapping and dual-level blend selection
//! - Deterministic synthetic pyramids for demos and tests

pub mod builder;
pub mod lod;
pub mod synthetic;
pub mod types;

pub use builder::{build_pyramid, length_in_pixels, BuildConfig, PyramidBuilder};
pub use lod::{
    nearest_lod_index, select_blend, select_blend_in, target_samples_per_pixel, LodBlendInfo,
    BASE_SECONDS_VISIBLE,
};
pub use synthetic::synthetic_pyramid;
pub use types::{
    DeckTransportState, FrequencyRange, LoopRegion, WaveformBandConfig, WaveformError,
    WaveformLod, WaveformPyramid,
};
