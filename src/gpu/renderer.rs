//! Deck waveform renderer.
//!
//! Drives one [`FrameTarget`]: zoom and resize pick the bound levels,
//! `frame` writes the uniform block and submits a single draw.

use std::sync::Arc;

use wgpu::RenderPipeline;

use super::context::{GpuContext, GpuError};
use super::pipelines::create_waveform_pipeline;
use super::resources::{BindingMode, WaveformResources};
use super::target::FrameTarget;
use super::uniforms::{UniformInputs, WaveUniforms};
use crate::config::{ConfigError, KnobUpdate, RendererConfig, WaveformKnobs};
use crate::waveform::{
    target_samples_per_pixel, DeckTransportState, LodBlendInfo, LoopRegion, WaveformPyramid,
};

/// Why a frame was not submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The target has a zero width or height.
    ZeroSized,
    /// The target could not provide a texture this tick.
    TargetUnavailable,
    Destroyed,
}

/// Result of one `frame` call. Frames never fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The waveform was drawn with the given binding.
    Drawn(BindingMode),
    /// No pyramid is bound yet; only the clear color was submitted.
    ClearedOnly,
    Skipped(SkipReason),
}

impl FrameOutcome {
    pub fn submitted(&self) -> bool {
        !matches!(self, FrameOutcome::Skipped(_))
    }
}

/// Renders one deck's scrolling waveform into a frame target.
pub struct DeckWaveformRenderer<T: FrameTarget> {
    ctx: GpuContext,
    target: T,
    pipeline: RenderPipeline,
    resources: WaveformResources,
    config: RendererConfig,
    knobs: WaveformKnobs,
    zoom: f64,
    /// Width in layout pixels, before the device pixel ratio.
    logical_width: f64,
    transport: DeckTransportState,
    loop_region: Option<LoopRegion>,
    frames_submitted: u64,
    last_dt: f64,
    destroyed: bool,
}

impl<T: FrameTarget> DeckWaveformRenderer<T> {
    /// Create a renderer with no pyramid bound; frames clear only.
    pub fn new(ctx: GpuContext, target: T, config: RendererConfig) -> Result<Self, GpuError> {
        config.validate()?;

        let resources = WaveformResources::new(&ctx, config.display.filter)?;
        let pipeline = create_waveform_pipeline(&ctx.device, resources.layout(), target.format());
        let (width, _) = target.size();

        Ok(Self {
            ctx,
            target,
            pipeline,
            resources,
            knobs: config.knobs,
            zoom: config.initial_zoom,
            logical_width: width as f64,
            config,
            transport: DeckTransportState::default(),
            loop_region: None,
            frames_submitted: 0,
            last_dt: 0.0,
            destroyed: false,
        })
    }

    /// Create a renderer and upload `pyramid`.
    pub fn create(
        pyramid: Arc<WaveformPyramid>,
        target: T,
        ctx: GpuContext,
        config: RendererConfig,
    ) -> Result<Self, GpuError> {
        let mut renderer = Self::new(ctx, target, config)?;
        renderer.load_pyramid(pyramid)?;
        Ok(renderer)
    }

    /// Replace the bound pyramid. On error the previous one stays bound.
    pub fn load_pyramid(&mut self, pyramid: Arc<WaveformPyramid>) -> Result<(), GpuError> {
        if self.destroyed {
            return Err(GpuError::Destroyed);
        }
        log::info!(
            "Loading waveform: {:.1}s, {} levels, {} bands",
            pyramid.duration(),
            pyramid.lods.len(),
            pyramid.band_count()
        );
        self.resources.upload(pyramid)?;
        self.rebind();
        Ok(())
    }

    fn rebind(&mut self) {
        let sample_rate = match self.resources.pyramid() {
            Some(pyramid) => pyramid.sample_rate as f64,
            None => return,
        };
        if self.logical_width <= 0.0 {
            log::debug!("Zero-width view, keeping current levels");
            return;
        }
        let target = target_samples_per_pixel(self.logical_width, sample_rate, self.zoom);
        self.resources.rebind(target);
    }

    /// Resize to `width` x `height` layout pixels at `device_pixel_ratio`.
    ///
    /// Level selection follows the layout width; the target gets the
    /// physical size. Zero sizes park the renderer until the next resize.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f64) {
        if self.destroyed {
            return;
        }
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            log::warn!("Ignoring device pixel ratio {}", device_pixel_ratio);
            1.0
        };
        let physical_width = (width as f64 * ratio).round() as u32;
        let physical_height = (height as f64 * ratio).round() as u32;

        self.logical_width = width as f64;
        self.target
            .resize(&self.ctx.device, physical_width, physical_height);
        self.rebind();
    }

    /// Set the zoom factor, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            log::warn!("Ignoring non-finite zoom {}", zoom);
            return;
        }
        let clamped = self.config.zoom.clamp(zoom);
        if clamped != zoom {
            log::debug!("Zoom {} clamped to {}", zoom, clamped);
        }
        self.zoom = clamped;
        self.rebind();
    }

    pub fn update_transport(&mut self, state: DeckTransportState) {
        self.transport = state.sanitized();
    }

    pub fn set_loop_region(&mut self, region: Option<LoopRegion>) {
        self.loop_region = region;
    }

    /// Apply a partial knob update. Invalid values leave the knobs unchanged.
    pub fn set_knobs(&mut self, update: &KnobUpdate) -> Result<(), ConfigError> {
        let knobs = self.knobs.merged(update);
        knobs.validate()?;
        self.knobs = knobs;
        Ok(())
    }

    pub fn knobs(&self) -> WaveformKnobs {
        self.knobs
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn transport(&self) -> DeckTransportState {
        self.transport
    }

    pub fn loop_region(&self) -> Option<LoopRegion> {
        self.loop_region
    }

    pub fn blend_info(&self) -> LodBlendInfo {
        self.resources.blend()
    }

    pub fn pyramid(&self) -> Option<&Arc<WaveformPyramid>> {
        self.resources.pyramid()
    }

    pub fn resources(&self) -> &WaveformResources {
        &self.resources
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Seconds since the previous frame, as passed to the last `frame` call.
    pub fn last_frame_delta(&self) -> f64 {
        self.last_dt
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Encode and submit one frame.
    ///
    /// Never returns an error: a frame that cannot draw the waveform
    /// clears to the background or is skipped, and the reason is logged.
    pub fn frame(&mut self, dt: f64, time: f64) -> FrameOutcome {
        if self.destroyed {
            return FrameOutcome::Skipped(SkipReason::Destroyed);
        }
        self.last_dt = dt;

        if self.target.is_zero_sized() {
            return FrameOutcome::Skipped(SkipReason::ZeroSized);
        }
        let frame = match self.target.acquire(&self.ctx.device) {
            Ok(Some(frame)) => frame,
            Ok(None) => return FrameOutcome::Skipped(SkipReason::TargetUnavailable),
            Err(err) => {
                log::warn!("Skipping frame: {}", err);
                return FrameOutcome::Skipped(SkipReason::TargetUnavailable);
            }
        };

        let binding = match (self.resources.pyramid(), self.resources.active_bind_group()) {
            (Some(pyramid), Some((mode, _))) => {
                let uniforms = WaveUniforms::encode(&UniformInputs {
                    view_size: self.target.size(),
                    pyramid,
                    blend: mode.bound_blend(self.resources.blend()),
                    transport: self.transport,
                    zoom: self.zoom,
                    time,
                    knobs: self.knobs,
                    display: &self.config.display,
                    loop_region: self.loop_region,
                });
                self.resources.write_uniforms(&uniforms);
                Some(mode)
            }
            _ => None,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("deck_waveform_encoder"),
            });

        {
            let [r, g, b] = self.config.display.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("deck_waveform_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let (Some(_), Some((_, bind_group))) = (binding, self.resources.active_bind_group()) {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, bind_group, &[]);
                // Fullscreen triangle
                render_pass.draw(0..3, 0..1);
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.frames_submitted += 1;

        match binding {
            Some(mode) => FrameOutcome::Drawn(mode),
            None => FrameOutcome::ClearedOnly,
        }
    }

    /// Release every GPU resource. Later frames are skipped and loads fail.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.resources.destroy();
        self.destroyed = true;
        log::info!("Deck waveform renderer destroyed after {} frames", self.frames_submitted);
    }
}
