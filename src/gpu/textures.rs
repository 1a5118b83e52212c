//! Texture management: half-float data textures, offscreen targets and readback.

use wgpu::{Device, Queue, Texture, TextureFormat, TextureUsages, TextureView};

use super::context::{GpuContext, GpuError};
use super::target::{AcquiredFrame, FrameTarget};

/// A texture that owns both texture and view.
/// The texture must outlive its view, so we keep them together.
pub struct GpuTexture {
    texture: Texture,
    view: TextureView,
}

impl GpuTexture {
    /// Create a new texture with the specified usage flags.
    ///
    /// Zero dimensions are clamped to 1.
    pub fn new(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
        usage: TextureUsages,
    ) -> Self {
        if width == 0 || height == 0 {
            log::debug!("Clamping {} texture from {}x{} to at least 1x1", label, width, height);
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Create a render target for final output (can be copied to CPU).
    pub fn for_output(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        Self::new(
            device,
            label,
            width,
            height,
            format,
            TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
        )
    }

    /// Create a sampled texture and fill it with binary16 texels.
    ///
    /// `texels` must hold `width * height * channels` values, row-major.
    pub fn half_float_data(
        device: &Device,
        queue: &Queue,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
        texels: &[u16],
    ) -> Self {
        let channels = match format {
            TextureFormat::Rg16Float => 2,
            TextureFormat::Rgba16Float => 4,
            _ => 1,
        };
        let width = width.max(1);
        let height = height.max(1);
        let target = Self::new(
            device,
            label,
            width,
            height,
            format,
            TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        );

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * channels * 2),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        target
    }

    /// Get the texture view for rendering or sampling.
    pub fn view(&self) -> &TextureView {
        &self.view
    }

    /// Get the underlying texture (for copy operations).
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    /// Release GPU memory now instead of waiting for the last reference.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Readback buffer for copying GPU texture data to CPU.
pub struct ReadbackBuffer {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_row_bytes: u32,
    unpadded_row_bytes: u32,
}

impl ReadbackBuffer {
    /// Create a new readback buffer sized for 4-byte pixels.
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let bytes_per_pixel = 4u32;
        let unpadded_row_bytes = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row_bytes = unpadded_row_bytes.div_ceil(align) * align;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback_buffer"),
            size: (padded_row_bytes * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            width,
            height,
            padded_row_bytes,
            unpadded_row_bytes,
        }
    }

    /// Get the underlying buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Get the padded bytes per row (for texture copy).
    pub fn padded_row_bytes(&self) -> u32 {
        self.padded_row_bytes
    }

    /// Record a copy of `texture` into this buffer.
    pub fn copy_from(&self, encoder: &mut wgpu::CommandEncoder, texture: &Texture) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_row_bytes),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Read pixels from the mapped buffer, removing row padding.
    pub fn read_pixels(&self, device: &Device) -> Result<Vec<u8>, GpuError> {
        let buffer_slice = self.buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GpuError::Readback(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| GpuError::Readback(e.to_string()))?
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        let mut pixels = Vec::with_capacity((self.width * self.height * 4) as usize);
        {
            let data = buffer_slice.get_mapped_range();
            for row in 0..self.height {
                let start = (row * self.padded_row_bytes) as usize;
                let end = start + self.unpadded_row_bytes as usize;
                pixels.extend_from_slice(&data[start..end]);
            }
        }
        self.buffer.unmap();
        Ok(pixels)
    }
}

/// Headless frame target rendering into an RGBA texture.
pub struct OffscreenTarget {
    texture: Option<GpuTexture>,
    width: u32,
    height: u32,
    format: TextureFormat,
}

impl OffscreenTarget {
    pub const FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let mut target = Self {
            texture: None,
            width: 0,
            height: 0,
            format: Self::FORMAT,
        };
        target.resize(device, width, height);
        target
    }

    /// Copy the last rendered frame back as tightly packed RGBA bytes.
    ///
    /// Empty for a zero-sized target.
    pub fn read_pixels(&self, ctx: &GpuContext) -> Result<Vec<u8>, GpuError> {
        let texture = match &self.texture {
            Some(texture) => texture,
            None => return Ok(Vec::new()),
        };

        let readback = ReadbackBuffer::new(&ctx.device, self.width, self.height);
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        readback.copy_from(&mut encoder, texture.texture());
        ctx.queue.submit(std::iter::once(encoder.finish()));

        readback.read_pixels(&ctx.device)
    }
}

impl FrameTarget for OffscreenTarget {
    fn format(&self) -> TextureFormat {
        self.format
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, device: &Device, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) && self.texture.is_some() {
            return;
        }
        if let Some(old) = self.texture.take() {
            old.destroy();
        }
        self.width = width;
        self.height = height;
        if width > 0 && height > 0 {
            self.texture = Some(GpuTexture::for_output(
                device,
                "offscreen_target",
                width,
                height,
                self.format,
            ));
        }
    }

    fn acquire(&mut self, _device: &Device) -> Result<Option<AcquiredFrame>, GpuError> {
        Ok(self.texture.as_ref().map(|texture| {
            AcquiredFrame::offscreen(
                texture
                    .texture()
                    .create_view(&wgpu::TextureViewDescriptor::default()),
            )
        }))
    }
}
