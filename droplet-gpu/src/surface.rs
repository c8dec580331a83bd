use wgpu::{Surface, SurfaceConfiguration, SurfaceTexture, TextureFormat};

/// Wrapper around wgpu::Surface with configuration management
pub struct SurfaceWrapper {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

impl SurfaceWrapper {
    pub fn new(surface: Surface<'static>, config: SurfaceConfiguration) -> Self {
        Self { surface, config }
    }

    pub fn format(&self) -> TextureFormat {
        self.config.format
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Resize the swapchain. Zero-sized requests are clamped to one pixel.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(device, &self.config);
    }

    /// Re-apply the current configuration after the surface was lost or outdated.
    pub fn reconfigure(&self, device: &wgpu::Device) {
        self.surface.configure(device, &self.config);
    }

    /// Get the current surface texture for rendering
    pub fn get_current_texture(&self) -> Result<SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }
}
