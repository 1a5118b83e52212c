//! GPU rendering using wgpu.
//!
//! Uploads every level of a waveform pyramid as half-float textures,
//! binds the two levels bracketing the current zoom, and draws the
//! scrolling deck waveform into a window surface or an offscreen texture.

pub mod context;
pub mod layouts;
pub mod pipelines;
pub mod renderer;
pub mod resources;
pub mod surface;
pub mod target;
pub mod textures;
pub mod uniforms;

pub use context::{GpuContext, GpuError};
pub use renderer::{DeckWaveformRenderer, FrameOutcome, SkipReason};
pub use resources::{BindingMode, WaveformResources};
pub use surface::SurfaceTarget;
pub use target::{AcquiredFrame, FrameTarget};
pub use textures::{GpuTexture, OffscreenTarget, ReadbackBuffer};
pub use uniforms::{split_playhead, join_playhead, WaveUniforms, PLAYHEAD_SPLIT};
