//! Window surface frame target.

use wgpu::{Adapter, Device, Surface, SurfaceConfiguration, TextureFormat};

use super::context::GpuError;
use super::target::{AcquiredFrame, FrameTarget};

/// Presents frames to a window surface.
///
/// The surface is only configured while it has a non-zero size.
pub struct SurfaceTarget {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    configured: bool,
}

impl SurfaceTarget {
    /// Pick a format for `surface` and configure it at `width` x `height`.
    pub fn new(
        surface: Surface<'static>,
        adapter: &Adapter,
        device: &Device,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuError> {
        let caps = surface.get_capabilities(adapter);
        // Colors are authored in display space, so prefer a linear-encoded format.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };

        let mut target = Self {
            surface,
            config,
            configured: false,
        };
        target.resize(device, width, height);
        Ok(target)
    }

    fn configure(&mut self, device: &Device) {
        self.surface.configure(device, &self.config);
        self.configured = true;
    }
}

impl FrameTarget for SurfaceTarget {
    fn format(&self) -> TextureFormat {
        self.config.format
    }

    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn resize(&mut self, device: &Device, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        if width == 0 || height == 0 {
            log::debug!("Surface resized to {}x{}, leaving it unconfigured", width, height);
            self.configured = false;
            return;
        }
        self.configure(device);
    }

    fn acquire(&mut self, device: &Device) -> Result<Option<AcquiredFrame>, GpuError> {
        if self.is_zero_sized() {
            return Ok(None);
        }
        if !self.configured {
            self.configure(device);
        }

        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(AcquiredFrame::from_surface(texture))),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.configure(device);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring surface texture");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
