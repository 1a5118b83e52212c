//! Deck Waveform
//!
//! GPU-rendered, zoomable DJ deck waveform with a fixed center playhead.
//!
//! # Features
//!
//! - Multi-resolution waveform pyramids built once per track from mono PCM
//! - Half-precision (binary16) texture packing for amplitude and band energy
//! - Log-space cross-fade between the two levels bracketing the zoom
//! - Sample-exact playhead on the GPU via a high/low position split
//! - wgpu rendering into a window surface or an offscreen texture
//! - Audio loading (WAV, MP3, FLAC, AAC) via Symphonia
//!
//! # Example
//!
//! ```no_run
//! use deck_waveform::{build_pyramid, DeckWaveformRenderer, GpuContext, OffscreenTarget, RendererConfig};
//! use std::sync::Arc;
//!
//! # async fn run(pcm: Vec<f32>) -> Result<(), deck_waveform::GpuError> {
//! let pyramid = Arc::new(build_pyramid(&pcm, 44100));
//! let ctx = GpuContext::new().await?;
//! let target = OffscreenTarget::new(&ctx.device, 1280, 200);
//! let mut renderer = DeckWaveformRenderer::create(pyramid, target, ctx, RendererConfig::default())?;
//! renderer.set_zoom(2.0);
//! renderer.frame(1.0 / 60.0, 0.0);
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod codec;
pub mod config;
pub mod gpu;
pub mod session;
pub mod waveform;

// Re-export commonly used types
pub use audio::{load_audio, load_mono, AudioData, AudioError};
pub use codec::{f16_to_f32, f32_to_f16};
pub use config::{
    ConfigError, DisplayConfig, KnobUpdate, RendererConfig, SamplerFilter, WaveformKnobs,
    ZoomRange,
};
pub use gpu::{
    split_playhead, DeckWaveformRenderer, FrameOutcome, FrameTarget, GpuContext, GpuError,
    OffscreenTarget, SkipReason, SurfaceTarget,
};
pub use session::{DeckSession, SessionError, TrackState};
pub use waveform::{
    build_pyramid, select_blend, synthetic_pyramid, target_samples_per_pixel, BuildConfig,
    DeckTransportState, LodBlendInfo, LoopRegion, PyramidBuilder, WaveformBandConfig,
    WaveformError, WaveformLod, WaveformPyramid,
};
