//! Per-frame uniform block for the waveform shader.
//!
//! The first eighteen slots are the stable deck-waveform layout; knob,
//! loop and beat-grid values follow. Every slot is four bytes and the
//! block is 128 bytes, a multiple of 16.

use crate::config::{DisplayConfig, WaveformKnobs};
use crate::waveform::{DeckTransportState, LodBlendInfo, LoopRegion, WaveformPyramid};

/// Divisor used to split sample positions into two exact f32 halves.
pub const PLAYHEAD_SPLIT: f64 = 65536.0;

/// Split a sample position into `(high, low)` with
/// `high * 65536 + low == samples` and `0 <= low < 65536`.
///
/// A single f32 loses whole samples past 2^24 (about six minutes at
/// 44.1 kHz); both halves stay exact for any realistic track length.
pub fn split_playhead(samples: f64) -> (f32, f32) {
    let samples = if samples.is_finite() { samples.max(0.0) } else { 0.0 };
    let high = (samples / PLAYHEAD_SPLIT).floor();
    let low = (samples - high * PLAYHEAD_SPLIT) as f32;
    // A fraction just under the split can round up to it in f32.
    if low >= PLAYHEAD_SPLIT as f32 {
        return ((high + 1.0) as f32, 0.0);
    }
    (high as f32, low)
}

/// Inverse of [`split_playhead`], as the shader computes it.
pub fn join_playhead(high: f32, low: f32) -> f64 {
    high as f64 * PLAYHEAD_SPLIT + low as f64
}

/// Uniform data passed to the waveform shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaveUniforms {
    pub view_width: f32,
    pub view_height: f32,
    pub playhead_high: f32,
    pub playhead_low: f32,
    pub sample_rate: f32,
    pub rate: f32,
    pub zoom_level: f32,
    pub primary_samples_per_pixel: f32,
    pub primary_length_in_pixels: f32,
    pub total_samples: f32,
    pub band_count: u32,
    pub center_y: f32,
    pub max_height: f32,
    pub time: f32,
    pub lod_blend_factor: f32,
    pub secondary_samples_per_pixel: f32,
    pub secondary_length_in_pixels: f32,
    pub beat_phase_offset: f32,
    pub bpm: f32,
    pub gain: f32,
    pub low_gain: f32,
    pub mid_gain: f32,
    pub high_gain: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub loop_active: f32,
    pub loop_start_high: f32,
    pub loop_start_low: f32,
    pub loop_end_high: f32,
    pub loop_end_low: f32,
    pub beat_grid_enabled: f32,
}

/// Everything one frame's uniforms are derived from.
#[derive(Debug, Clone, Copy)]
pub struct UniformInputs<'a> {
    /// Physical target size in pixels.
    pub view_size: (u32, u32),
    pub pyramid: &'a WaveformPyramid,
    pub blend: LodBlendInfo,
    pub transport: DeckTransportState,
    pub zoom: f64,
    pub time: f64,
    pub knobs: WaveformKnobs,
    pub display: &'a DisplayConfig,
    pub loop_region: Option<LoopRegion>,
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl WaveUniforms {
    pub fn encode(inputs: &UniformInputs<'_>) -> Self {
        let pyramid = inputs.pyramid;
        let level = |index: usize| {
            pyramid
                .lods
                .get(index)
                .map(|lod| (lod.samples_per_pixel as f32, lod.length_in_pixels.max(1) as f32))
                .unwrap_or((1.0, 1.0))
        };
        let (primary_spp, primary_len) = level(inputs.blend.primary_index);
        let (secondary_spp, secondary_len) = level(inputs.blend.secondary_index);

        let transport = inputs.transport.sanitized();
        let (playhead_high, playhead_low) = split_playhead(transport.playhead_samples);

        let loop_region = inputs
            .loop_region
            .filter(|_| inputs.display.show_loop_region);
        let (loop_start_high, loop_start_low) =
            split_playhead(loop_region.map_or(0.0, |r| r.start_samples));
        let (loop_end_high, loop_end_low) =
            split_playhead(loop_region.map_or(0.0, |r| r.end_samples));

        let knobs = inputs.knobs;
        Self {
            view_width: inputs.view_size.0.max(1) as f32,
            view_height: inputs.view_size.1.max(1) as f32,
            playhead_high,
            playhead_low,
            sample_rate: pyramid.sample_rate as f32,
            rate: transport.rate as f32,
            zoom_level: inputs.zoom as f32,
            primary_samples_per_pixel: primary_spp,
            primary_length_in_pixels: primary_len,
            total_samples: pyramid.total_samples as f32,
            band_count: pyramid.band_count() as u32,
            center_y: inputs.display.center_y,
            max_height: inputs.display.max_height,
            time: inputs.time as f32,
            lod_blend_factor: inputs.blend.blend_factor.clamp(0.0, 1.0) as f32,
            secondary_samples_per_pixel: secondary_spp,
            secondary_length_in_pixels: secondary_len,
            beat_phase_offset: transport.beat_phase_offset as f32,
            bpm: transport.bpm as f32,
            gain: knobs.gain,
            low_gain: knobs.low_gain,
            mid_gain: knobs.mid_gain,
            high_gain: knobs.high_gain,
            brightness: knobs.brightness,
            contrast: knobs.contrast,
            saturation: knobs.saturation,
            loop_active: flag(loop_region.is_some()),
            loop_start_high,
            loop_start_low,
            loop_end_high,
            loop_end_low,
            beat_grid_enabled: flag(inputs.display.show_beat_grid && transport.bpm > 0.0),
        }
    }

    /// Playhead position reassembled from its two halves.
    pub fn playhead(&self) -> f64 {
        join_playhead(self.playhead_high, self.playhead_low)
    }
}
