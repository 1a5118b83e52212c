//! Track lifecycle for one deck.
//!
//! A session owns the pyramid builder and the renderer, and tracks where
//! the current load is: building the pyramid, uploading it, or ready to
//! draw. A failed load never replaces a pyramid that is already bound.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::audio::{load_mono, AudioError};
use crate::config::ConfigError;
use crate::gpu::{DeckWaveformRenderer, FrameOutcome, FrameTarget, GpuError};
use crate::waveform::{BuildConfig, PyramidBuilder, WaveformPyramid};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Session has been destroyed")]
    Destroyed,
}

/// Where the current track load stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Uninitialized,
    Building,
    Uploading,
    /// A pyramid is bound and frames draw it.
    Ready,
    /// The last load failed and nothing is bound.
    Failed,
    Destroyed,
}

/// One deck: pyramid builder, renderer and track state.
pub struct DeckSession<T: FrameTarget> {
    renderer: DeckWaveformRenderer<T>,
    builder: PyramidBuilder,
    state: TrackState,
    autoplay: bool,
}

impl<T: FrameTarget> DeckSession<T> {
    pub fn new(renderer: DeckWaveformRenderer<T>, build_config: BuildConfig) -> Result<Self, SessionError> {
        let state = if renderer.pyramid().is_some() {
            TrackState::Ready
        } else {
            TrackState::Uninitialized
        };
        Ok(Self {
            renderer,
            builder: PyramidBuilder::new(build_config)?,
            state,
            autoplay: false,
        })
    }

    /// Build a pyramid from mono PCM and bind it.
    pub fn load_pcm(
        &mut self,
        pcm: &[f32],
        sample_rate: u32,
    ) -> Result<Arc<WaveformPyramid>, SessionError> {
        self.ensure_alive()?;
        self.state = TrackState::Building;
        let pyramid = Arc::new(self.builder.build(pcm, sample_rate));
        self.load_pyramid(pyramid.clone())?;
        Ok(pyramid)
    }

    /// Bind an already built pyramid.
    pub fn load_pyramid(&mut self, pyramid: Arc<WaveformPyramid>) -> Result<(), SessionError> {
        self.ensure_alive()?;
        self.state = TrackState::Uploading;
        match self.renderer.load_pyramid(pyramid) {
            Ok(()) => {
                self.state = TrackState::Ready;
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Decode `path`, fold it to mono and load it.
    pub fn load_file(&mut self, path: &Path) -> Result<Arc<WaveformPyramid>, SessionError> {
        self.ensure_alive()?;
        self.state = TrackState::Building;
        let (pcm, sample_rate) = match load_mono(path) {
            Ok(decoded) => decoded,
            Err(err) => return Err(self.fail(err.into())),
        };
        self.load_pcm(&pcm, sample_rate)
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        log::warn!("Track load failed: {}", err);
        self.state = if self.renderer.pyramid().is_some() {
            TrackState::Ready
        } else {
            TrackState::Failed
        };
        err
    }

    fn ensure_alive(&self) -> Result<(), SessionError> {
        if self.state == TrackState::Destroyed {
            return Err(SessionError::Destroyed);
        }
        Ok(())
    }

    /// Advance the transport on its own each tick instead of waiting for
    /// `update_transport`. For demos and test harnesses.
    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    /// Run one render-loop tick.
    pub fn tick(&mut self, dt: f64, time: f64) -> FrameOutcome {
        if self.autoplay {
            if let Some(pyramid) = self.renderer.pyramid() {
                let next = self.renderer.transport().advanced(
                    dt,
                    pyramid.sample_rate,
                    pyramid.total_samples,
                );
                self.renderer.update_transport(next);
            }
        }
        self.renderer.frame(dt, time)
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn pyramid(&self) -> Option<&Arc<WaveformPyramid>> {
        self.renderer.pyramid()
    }

    pub fn renderer(&self) -> &DeckWaveformRenderer<T> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut DeckWaveformRenderer<T> {
        &mut self.renderer
    }

    pub fn destroy(&mut self) {
        self.renderer.destroy();
        self.state = TrackState::Destroyed;
    }
}
