use droplet_gpu::RendererError;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("Renderer error: {0}")]
    Renderer(#[from] RendererError),
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("Failed to create {what}: {message}")]
    Resource { what: &'static str, message: String },
    #[error("Event loop exited before a window was created")]
    NoWindow,
}

impl ViewerError {
    pub(crate) fn resource(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Resource {
            what,
            message: err.to_string(),
        }
    }
}
