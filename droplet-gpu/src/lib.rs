//! GPU plumbing shared by the droplet viewer.
//!
//! Owns device/queue creation, surface configuration, small builders over the
//! raw wgpu descriptors, and the render delegates that turn borrowed particle
//! buffers into draw calls.

mod box_lines;
mod builder;
mod delegate;
pub mod delegates;
mod pipeline;
pub mod shaders;
mod surface;
mod types;

pub use box_lines::{BOX_EDGE_COUNT, BOX_VERTEX_COUNT, BoxLines, DEFAULT_LINE_COLOR};
pub use builder::{BufferBuildError, BufferBuilder, BufferUsage};
pub use delegate::{
    ID_STRIDE, POSITION_STRIDE, ParticleBuffers, ParticleDelegate, RenderContext, ViewportRect,
};
pub use pipeline::{PipelineBuildError, RenderPipelineBuilder};
pub use surface::SurfaceWrapper;
pub use types::{CameraUniforms, LineUniforms, ShadingParams, SpriteUniforms};

pub use wgpu;

use tracing::{info, instrument};

/// Depth/stencil target requested for every frame (24-bit depth, 8-bit stencil).
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Request Adapter Error: {0}")]
    RequestAdapterError(#[from] wgpu::RequestAdapterError),
    #[error("Request Device Error: {0}")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
    #[error("Create surface error: {0}")]
    CreateSurfaceError(#[from] wgpu::CreateSurfaceError),
    #[error("Surface reports no supported formats for this adapter")]
    UnsupportedSurface,
}

/// Device, queue and the adapter they were created from.
pub struct Renderer {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Renderer {
    /// Create the wgpu instance. Surfaces must come from this instance before
    /// [`Renderer::new`] is called so the adapter can be matched to them.
    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default())
    }

    #[instrument(level = "info", skip_all)]
    pub async fn new(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, RendererError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface,
            })
            .await?;

        let adapter_info = adapter.get_info();
        info!(
            "Using adapter {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Renderer"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Start building a buffer on this renderer's device.
    pub fn create_buffer(&self) -> BufferBuilder<'_> {
        BufferBuilder::new(&self.device)
    }

    /// Configure `surface` for presentation at the given framebuffer size.
    ///
    /// Prefers an sRGB 8-bit format and never waits for vblank.
    pub fn configure_surface(
        &self,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<SurfaceWrapper, RendererError> {
        let caps = surface.get_capabilities(&self.adapter);
        let format = pick_surface_format(&caps.formats).ok_or(RendererError::UnsupportedSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&self.device, &config);
        info!(
            "Surface configured: {}x{} {:?}",
            config.width, config.height, config.format
        );

        Ok(SurfaceWrapper::new(surface, config))
    }
}

fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    const PREFERRED: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    PREFERRED
        .iter()
        .copied()
        .find(|f| formats.contains(f))
        .or_else(|| formats.iter().copied().find(|f| f.is_srgb()))
        .or_else(|| formats.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_8bit_srgb_formats() {
        let formats = [
            wgpu::TextureFormat::Rgba16Float,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ];
        assert_eq!(
            pick_surface_format(&formats),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [wgpu::TextureFormat::Rgba16Float];
        assert_eq!(
            pick_surface_format(&formats),
            Some(wgpu::TextureFormat::Rgba16Float)
        );
        assert_eq!(pick_surface_format(&[]), None);
    }
}
