//! GPU context initialization and management.

use std::sync::Arc;
use wgpu::{Adapter, Device, Instance, Queue};

use crate::config::ConfigError;
use crate::waveform::WaveformError;

/// Errors that can occur during GPU operations.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("Texture {label} ({width}x{height}) exceeds device limit {max}")]
    TextureTooLarge {
        label: String,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("GPU allocation failed for {label}: {reason}")]
    Allocation { label: String, reason: String },
    #[error("Invalid renderer configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Waveform rejected before upload: {0}")]
    Shape(#[from] WaveformError),
    #[error("Surface reports no supported formats for this adapter")]
    UnsupportedSurface,
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("Readback failed: {0}")]
    Readback(String),
    #[error("Renderer has been destroyed")]
    Destroyed,
}

/// GPU context holding device and queue for rendering.
///
/// Cloning shares the same device.
#[derive(Clone)]
pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Arc<Adapter>,
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a new GPU context for headless rendering.
    pub async fn new() -> Result<Self, GpuError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::METAL | wgpu::Backends::VULKAN | wgpu::Backends::GL,
            ..Default::default()
        });
        Self::with_instance(instance, None).await
    }

    /// Create a context whose adapter can present to `surface`.
    pub async fn for_surface(
        instance: Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<Self, GpuError> {
        Self::with_instance(instance, Some(surface)).await
    }

    async fn with_instance(
        instance: Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, GpuError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("deck-waveform"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let info = adapter.get_info();
        log::info!("Using GPU adapter {} ({:?})", info.name, info.backend);

        Ok(Self::from_parts(instance, adapter, device, queue))
    }

    /// Wrap a device the host already created.
    pub fn from_parts(instance: Instance, adapter: Adapter, device: Device, queue: Queue) -> Self {
        Self {
            instance,
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        }
    }

    /// Get info about the GPU adapter.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Largest width or height accepted for a 2D texture.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
