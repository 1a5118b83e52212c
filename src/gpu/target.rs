//! Where a frame is drawn: a presentable surface or an offscreen texture.

use wgpu::{Device, SurfaceTexture, TextureFormat, TextureView};

use super::context::GpuError;

/// A color attachment acquired for one frame.
pub struct AcquiredFrame {
    pub view: TextureView,
    surface_texture: Option<SurfaceTexture>,
}

impl AcquiredFrame {
    /// Frame backed by a texture the target keeps ownership of.
    pub fn offscreen(view: TextureView) -> Self {
        Self {
            view,
            surface_texture: None,
        }
    }

    /// Frame backed by a swapchain image that must be presented.
    pub fn from_surface(surface_texture: SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            view,
            surface_texture: Some(surface_texture),
        }
    }

    /// Queue the frame for display. No-op for offscreen frames.
    pub fn present(self) {
        if let Some(surface_texture) = self.surface_texture {
            surface_texture.present();
        }
    }
}

/// Render destination driven by the waveform renderer.
///
/// A target with a zero width or height is a valid resting state:
/// `acquire` returns `Ok(None)` and the frame is skipped without
/// allocating anything.
pub trait FrameTarget {
    fn format(&self) -> TextureFormat;

    /// Physical size in pixels.
    fn size(&self) -> (u32, u32);

    fn resize(&mut self, device: &Device, width: u32, height: u32);

    /// Get the attachment for the next frame, or `None` when nothing
    /// should be drawn this tick.
    fn acquire(&mut self, device: &Device) -> Result<Option<AcquiredFrame>, GpuError>;

    fn is_zero_sized(&self) -> bool {
        let (width, height) = self.size();
        width == 0 || height == 0
    }
}
