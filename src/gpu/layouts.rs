//! Bind group layout builders for the waveform pipeline.
//!
//! The waveform layout binds two detail levels at once so the fragment
//! stage can cross-fade them in a single pass.

use wgpu::{BindGroupLayout, BindGroupLayoutEntry, Device, ShaderStages};

/// Binding slots of the waveform bind group.
pub mod slots {
    pub const UNIFORMS: u32 = 0;
    pub const PRIMARY_AMPLITUDE: u32 = 1;
    pub const PRIMARY_BANDS: u32 = 2;
    pub const SECONDARY_AMPLITUDE: u32 = 3;
    pub const SECONDARY_BANDS: u32 = 4;
    pub const SAMPLER: u32 = 5;
}

/// Builder for creating bind group layouts with common patterns.
pub struct BindGroupLayoutBuilder {
    label: Option<&'static str>,
    entries: Vec<BindGroupLayoutEntry>,
}

impl BindGroupLayoutBuilder {
    /// Create a new bind group layout builder.
    pub fn new(label: &'static str) -> Self {
        Self {
            label: Some(label),
            entries: Vec::new(),
        }
    }

    /// Add a uniform buffer entry.
    pub fn uniform(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    /// Add a filterable 2D float texture entry.
    pub fn texture_2d(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        self
    }

    /// Add a filtering sampler entry.
    pub fn sampler(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        self
    }

    /// Build the bind group layout.
    pub fn build(self, device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: self.label,
            entries: &self.entries,
        })
    }
}

/// Dual-level layout: uniforms, primary amplitude + bands, secondary
/// amplitude + bands, sampler.
pub fn create_waveform_layout(device: &Device) -> BindGroupLayout {
    BindGroupLayoutBuilder::new("waveform_bind_group_layout")
        .uniform(slots::UNIFORMS, ShaderStages::VERTEX | ShaderStages::FRAGMENT)
        .texture_2d(slots::PRIMARY_AMPLITUDE, ShaderStages::FRAGMENT)
        .texture_2d(slots::PRIMARY_BANDS, ShaderStages::FRAGMENT)
        .texture_2d(slots::SECONDARY_AMPLITUDE, ShaderStages::FRAGMENT)
        .texture_2d(slots::SECONDARY_BANDS, ShaderStages::FRAGMENT)
        .sampler(slots::SAMPLER, ShaderStages::FRAGMENT)
        .build(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[tokio::test]
    async fn test_bind_group_layout_builder() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return, // Skip if no GPU
        };

        let layout = BindGroupLayoutBuilder::new("test_layout")
            .uniform(0, ShaderStages::VERTEX)
            .texture_2d(1, ShaderStages::FRAGMENT)
            .sampler(2, ShaderStages::FRAGMENT)
            .build(&ctx.device);

        drop(layout);
    }

    #[tokio::test]
    async fn test_waveform_layout_creation() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let _layout = create_waveform_layout(&ctx.device);
    }
}
