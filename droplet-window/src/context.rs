use std::sync::Arc;

use droplet_gpu::{DEPTH_FORMAT, Renderer, RendererError, SurfaceWrapper};
use tracing::{debug, instrument};
use winit::window::Window;

use crate::error::ViewerError;

/// Depth/stencil attachment sized to the surface.
struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Window plus everything needed to present into it.
pub struct GpuContext {
    window: Arc<Window>,
    renderer: Renderer,
    surface: SurfaceWrapper,
    depth: DepthTarget,
}

impl GpuContext {
    /// Create surface, adapter, device and depth target for `window`.
    #[instrument(level = "info", skip_all)]
    pub fn new(window: Arc<Window>) -> Result<Self, ViewerError> {
        let size = window.inner_size();
        let instance = Renderer::create_instance();
        let surface = instance
            .create_surface(window.clone())
            .map_err(RendererError::from)?;
        let renderer = pollster::block_on(Renderer::new(instance, Some(&surface)))?;
        let surface = renderer.configure_surface(surface, size.width, size.height)?;
        let depth = DepthTarget::new(renderer.device(), surface.width(), surface.height());

        Ok(Self {
            window,
            renderer,
            surface,
            depth,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn device(&self) -> &wgpu::Device {
        self.renderer.device()
    }

    pub fn queue(&self) -> &wgpu::Queue {
        self.renderer.queue()
    }

    pub fn surface(&self) -> &SurfaceWrapper {
        &self.surface
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface.format()
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }

    /// Framebuffer size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    /// Reconfigure the surface and rebuild the depth target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        debug!("Resizing surface to {}x{}", width, height);
        self.surface.resize(self.renderer.device(), width, height);
        self.depth = DepthTarget::new(self.renderer.device(), width, height);
    }

    /// Reconfigure with the current size after the surface was lost or outdated.
    pub fn reconfigure(&mut self) {
        self.surface.reconfigure(self.renderer.device());
    }
}
