//! GPU resources for one loaded pyramid.
//!
//! Owns one amplitude + band texture pair per level, the sampler, the
//! uniform buffer and the bind group selecting the two levels being
//! cross-faded. Replacing the pyramid releases every texture of the old
//! one before the new ones are created.
//!
//! Allocations and bind group creation run inside wgpu error scopes, so
//! out-of-memory and validation failures come back as `GpuError` instead
//! of reaching the device's uncaptured-error handler.

use std::sync::Arc;

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, Queue, Sampler, TextureFormat};

use super::context::{GpuContext, GpuError};
use super::layouts::{create_waveform_layout, slots};
use super::textures::GpuTexture;
use super::uniforms::WaveUniforms;
use crate::codec::{pack_amplitude, pack_bands, texture_width};
use crate::config::SamplerFilter;
use crate::waveform::{nearest_lod_index, select_blend, LodBlendInfo, WaveformPyramid};

pub const AMPLITUDE_FORMAT: TextureFormat = TextureFormat::Rg16Float;
pub const BAND_FORMAT: TextureFormat = TextureFormat::R16Float;

/// Textures for one level of detail.
pub struct LodTextures {
    pub samples_per_pixel: u32,
    pub width: u32,
    amplitude: GpuTexture,
    bands: GpuTexture,
}

impl LodTextures {
    fn destroy(&self) {
        self.amplitude.destroy();
        self.bands.destroy();
    }

    /// Bytes of texture memory held by this level.
    pub fn byte_size(&self) -> u64 {
        let (aw, ah) = self.amplitude.size();
        let (bw, bh) = self.bands.size();
        aw as u64 * ah as u64 * 4 + bw as u64 * bh as u64 * 2
    }
}

/// Which bind group the next frame will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Two levels bound for cross-fading.
    Dual { primary: usize, secondary: usize },
    /// The nearest level bound to both slots.
    Single { level: usize },
}

impl BindingMode {
    /// Levels and blend describing what this binding puts in the texture
    /// slots, given the zoom's `selected` blend.
    pub fn bound_blend(&self, selected: LodBlendInfo) -> LodBlendInfo {
        match *self {
            BindingMode::Dual { .. } => selected,
            BindingMode::Single { level } => LodBlendInfo::single(level),
        }
    }
}

/// Run `create` inside an error scope for `filter`, returning whatever
/// error the device captured.
fn scoped<T>(
    device: &Device,
    filter: wgpu::ErrorFilter,
    create: impl FnOnce() -> T,
) -> (T, Option<wgpu::Error>) {
    let scope = device.push_error_scope(filter);
    let value = create();
    let error = pollster::block_on(scope.pop());
    (value, error)
}

fn allocation_result(label: &str, error: Option<wgpu::Error>) -> Result<(), GpuError> {
    match error {
        None => Ok(()),
        Some(err) => Err(GpuError::Allocation {
            label: label.to_string(),
            reason: err.to_string(),
        }),
    }
}

/// Per-track GPU state of the waveform renderer.
pub struct WaveformResources {
    device: Arc<Device>,
    queue: Arc<Queue>,
    layout: BindGroupLayout,
    sampler: Sampler,
    uniform_buffer: Buffer,
    levels: Vec<LodTextures>,
    pyramid: Option<Arc<WaveformPyramid>>,
    blend: LodBlendInfo,
    dual_bind_group: Option<(BindingMode, BindGroup)>,
    fallback_bind_group: Option<(BindingMode, BindGroup)>,
    destroyed: bool,
}

impl WaveformResources {
    pub fn new(ctx: &GpuContext, filter: SamplerFilter) -> Result<Self, GpuError> {
        let device = ctx.device.clone();
        let layout = create_waveform_layout(&device);

        let filter_mode = filter.to_wgpu();
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("waveform_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter_mode,
            min_filter: filter_mode,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let (uniform_buffer, error) = scoped(&device, wgpu::ErrorFilter::OutOfMemory, || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("waveform_uniforms"),
                size: std::mem::size_of::<WaveUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        allocation_result("waveform_uniforms", error)?;

        Ok(Self {
            device,
            queue: ctx.queue.clone(),
            layout,
            sampler,
            uniform_buffer,
            levels: Vec::new(),
            pyramid: None,
            blend: LodBlendInfo::default(),
            dual_bind_group: None,
            fallback_bind_group: None,
            destroyed: false,
        })
    }

    /// Check `pyramid` against the shape rules and the device limits
    /// without touching any GPU state.
    pub fn check(pyramid: &WaveformPyramid, max_dimension: u32) -> Result<(), GpuError> {
        pyramid.validate()?;

        let band_rows = pyramid.band_count() as u32;
        for (index, lod) in pyramid.lods.iter().enumerate() {
            let width = texture_width(lod);
            if width > max_dimension || band_rows > max_dimension {
                return Err(GpuError::TextureTooLarge {
                    label: format!("waveform_lod{}", index),
                    width,
                    height: band_rows,
                    max: max_dimension,
                });
            }
        }
        Ok(())
    }

    /// Replace the bound pyramid with `pyramid`, uploading every level.
    ///
    /// Shape and device-limit failures are caught before anything is
    /// released, so the previous pyramid stays bound. The old levels are
    /// released before the new ones are allocated; if allocation then
    /// fails, the partial set is destroyed and nothing is bound.
    pub fn upload(&mut self, pyramid: Arc<WaveformPyramid>) -> Result<(), GpuError> {
        if self.destroyed {
            return Err(GpuError::Destroyed);
        }
        Self::check(&pyramid, self.device.limits().max_texture_dimension_2d)?;

        self.release_levels();

        let (levels, error) = scoped(&self.device, wgpu::ErrorFilter::OutOfMemory, || {
            self.create_levels(&pyramid)
        });
        if let Err(err) = allocation_result("waveform levels", error) {
            for level in &levels {
                level.destroy();
            }
            log::warn!("Waveform upload failed: {}", err);
            return Err(err);
        }

        self.levels = levels;
        log::info!(
            "Uploaded {} waveform levels ({} KiB)",
            self.levels.len(),
            self.texture_bytes() / 1024
        );
        self.pyramid = Some(pyramid);
        Ok(())
    }

    fn create_levels(&self, pyramid: &WaveformPyramid) -> Vec<LodTextures> {
        let band_count = pyramid.band_count();
        pyramid
            .lods
            .iter()
            .enumerate()
            .map(|(index, lod)| {
                let width = texture_width(lod);
                let amplitude = GpuTexture::half_float_data(
                    &self.device,
                    &self.queue,
                    &format!("waveform_lod{}_amplitude", index),
                    width,
                    1,
                    AMPLITUDE_FORMAT,
                    &pack_amplitude(lod),
                );
                let bands = GpuTexture::half_float_data(
                    &self.device,
                    &self.queue,
                    &format!("waveform_lod{}_bands", index),
                    width,
                    band_count as u32,
                    BAND_FORMAT,
                    &pack_bands(lod, band_count),
                );
                LodTextures {
                    samples_per_pixel: lod.samples_per_pixel,
                    width,
                    amplitude,
                    bands,
                }
            })
            .collect()
    }

    /// Pick the levels for `target_samples_per_pixel` and rebuild the bind
    /// group if the pair changed.
    ///
    /// A dual bind group the device rejects is dropped, and frames fall
    /// back to the nearest level bound on its own.
    pub fn rebind(&mut self, target_samples_per_pixel: f64) -> LodBlendInfo {
        let pyramid = match &self.pyramid {
            Some(pyramid) => pyramid.clone(),
            None => return LodBlendInfo::default(),
        };

        let blend = select_blend(&pyramid, target_samples_per_pixel);
        self.blend = blend;

        let dual = BindingMode::Dual {
            primary: blend.primary_index,
            secondary: blend.secondary_index,
        };
        if self.dual_bind_group.as_ref().map(|(mode, _)| *mode) != Some(dual) {
            self.dual_bind_group = None;
            let (group, error) = scoped(&self.device, wgpu::ErrorFilter::Validation, || {
                self.bind_levels(blend.primary_index, blend.secondary_index)
            });
            self.dual_bind_group = match error {
                None => group.map(|group| (dual, group)),
                Some(err) => {
                    log::warn!("Dual-level bind group rejected: {}", err);
                    None
                }
            };
            log::debug!(
                "Rebound waveform levels {} / {} (blend {:.3})",
                blend.primary_index,
                blend.secondary_index,
                blend.blend_factor
            );
        }

        let nearest = nearest_lod_index(&pyramid, target_samples_per_pixel);
        let single = BindingMode::Single { level: nearest };
        if self.fallback_bind_group.as_ref().map(|(mode, _)| *mode) != Some(single) {
            self.fallback_bind_group = None;
            let (group, error) = scoped(&self.device, wgpu::ErrorFilter::Validation, || {
                self.bind_levels(nearest, nearest)
            });
            self.fallback_bind_group = match error {
                None => group.map(|group| (single, group)),
                Some(err) => {
                    log::warn!("Single-level bind group rejected: {}", err);
                    None
                }
            };
        }

        if self.dual_bind_group.is_none() {
            log::warn!("Dual-level binding unavailable, using level {} alone", nearest);
        }

        blend
    }

    fn bind_levels(&self, primary: usize, secondary: usize) -> Option<BindGroup> {
        let primary = self.levels.get(primary)?;
        let secondary = self.levels.get(secondary)?;

        Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("waveform_bind_group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: slots::UNIFORMS,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slots::PRIMARY_AMPLITUDE,
                    resource: wgpu::BindingResource::TextureView(primary.amplitude.view()),
                },
                wgpu::BindGroupEntry {
                    binding: slots::PRIMARY_BANDS,
                    resource: wgpu::BindingResource::TextureView(primary.bands.view()),
                },
                wgpu::BindGroupEntry {
                    binding: slots::SECONDARY_AMPLITUDE,
                    resource: wgpu::BindingResource::TextureView(secondary.amplitude.view()),
                },
                wgpu::BindGroupEntry {
                    binding: slots::SECONDARY_BANDS,
                    resource: wgpu::BindingResource::TextureView(secondary.bands.view()),
                },
                wgpu::BindGroupEntry {
                    binding: slots::SAMPLER,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }))
    }

    /// Bind group for the next draw, preferring the dual-level one.
    pub fn active_bind_group(&self) -> Option<(BindingMode, &BindGroup)> {
        self.dual_bind_group
            .as_ref()
            .or(self.fallback_bind_group.as_ref())
            .map(|(mode, group)| (*mode, group))
    }

    /// Blend info for the active bind group: the zoom's selection for the
    /// dual binding, the bound level alone for the fallback.
    pub fn bound_blend(&self) -> Option<LodBlendInfo> {
        self.active_bind_group()
            .map(|(mode, _)| mode.bound_blend(self.blend))
    }

    pub fn write_uniforms(&self, uniforms: &WaveUniforms) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn layout(&self) -> &BindGroupLayout {
        &self.layout
    }

    pub fn pyramid(&self) -> Option<&Arc<WaveformPyramid>> {
        self.pyramid.as_ref()
    }

    pub fn blend(&self) -> LodBlendInfo {
        self.blend
    }

    pub fn levels(&self) -> &[LodTextures] {
        &self.levels
    }

    pub fn texture_bytes(&self) -> u64 {
        self.levels.iter().map(LodTextures::byte_size).sum()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn release_levels(&mut self) {
        // Bind groups reference the views, drop them first.
        self.dual_bind_group = None;
        self.fallback_bind_group = None;
        for level in self.levels.drain(..) {
            level.destroy();
        }
        self.pyramid = None;
        self.blend = LodBlendInfo::default();
    }

    /// Release all GPU memory. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.release_levels();
        self.uniform_buffer.destroy();
        self.destroyed = true;
        log::debug!("Waveform resources destroyed");
    }
}

impl Drop for WaveformResources {
    fn drop(&mut self) {
        self.destroy();
    }
}
