//! The frame orchestrator: owns the window, GPU context, controls and overlay,
//! and draws one frame per [`Viewer::render`] call.

use std::sync::Arc;
use std::time::Duration;

use droplet_gpu::delegates::PointSpriteDelegate;
use droplet_gpu::{
    BoxLines, DEFAULT_LINE_COLOR, DEPTH_FORMAT, ParticleBuffers, ParticleDelegate, RenderContext,
    Renderer,
};
use glam::Vec3;
use tracing::{debug, info, info_span, instrument, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::bounds::BoundingBox;
use crate::camera::Camera;
use crate::context::GpuContext;
use crate::controls::{Controls, Dispatch};
use crate::error::ViewerError;
use crate::frame_control::{Frame, FrameControl};
use crate::overlay::{GuiOverlay, PanelResponse};
use crate::params::FluidParams;
use crate::run_control::{RunState, Shortcuts};

/// How long the startup pump may wait for the platform to hand out a window.
const INIT_TIMEOUT: Duration = Duration::from_millis(100);

/// Window and camera setup for a [`Viewer`].
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    /// Requested inner size in logical pixels.
    pub width: u32,
    pub height: u32,
    pub camera_position: Vec3,
    pub camera_focus: Vec3,
    pub clear_color: wgpu::Color,
    /// RGBA of the bounding box wireframe.
    pub box_color: [f32; 4],
    /// Radius of a particle sprite in world units.
    pub point_radius: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Fluid".to_string(),
            width: 800,
            height: 600,
            camera_position: Vec3::new(0.0, 0.0, 30.0),
            camera_focus: Vec3::ZERO,
            clear_color: wgpu::Color {
                r: 0.2,
                g: 0.3,
                b: 0.3,
                a: 1.0,
            },
            box_color: DEFAULT_LINE_COLOR,
            point_radius: 0.5,
        }
    }
}

impl ViewerConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_camera(mut self, position: Vec3, focus: Vec3) -> Self {
        self.camera_position = position;
        self.camera_focus = focus;
        self
    }

    pub fn with_clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_box_color(mut self, color: [f32; 4]) -> Self {
        self.box_color = color;
        self
    }

    pub fn with_point_radius(mut self, radius: f32) -> Self {
        self.point_radius = radius;
        self
    }

    fn window_attributes(&self) -> WindowAttributes {
        Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.width.max(1), self.height.max(1)))
            .with_resizable(true)
    }
}

/// Creates the window during the first pump of the event loop.
struct WindowInit {
    attributes: Option<WindowAttributes>,
    result: Option<Result<Window, OsError>>,
}

impl ApplicationHandler for WindowInit {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attributes) = self.attributes.take() {
            self.result = Some(event_loop.create_window(attributes));
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

/// Everything the event handler and the frame need, apart from the event loop.
struct ViewerState<D> {
    gpu: GpuContext,
    controls: Controls,
    gui: GuiOverlay,
    delegate: D,
    box_lines: BoxLines,
    bounds: BoundingBox,
    params: FluidParams,
    control: FrameControl,
    clear_color: wgpu::Color,
    point_radius: f32,
}

impl<D> ApplicationHandler for ViewerState<D> {
    fn resumed(&mut self, _: &ActiveEventLoop) {}

    fn window_event(&mut self, _: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if window_id != self.gpu.window().id() {
            return;
        }
        match self.controls.dispatch(&event, &mut self.gui) {
            Dispatch::CloseRequested => {
                info!("Close requested");
                self.control.request_close();
            }
            Dispatch::Resized(viewport) => self.gpu.resize(viewport.width, viewport.height),
            Dispatch::Consumed | Dispatch::Applied | Dispatch::Ignored => {}
        }
    }
}

/// Interactive viewer for a particle simulation.
///
/// The driver owns the loop: it steps its solver, then hands the particle
/// buffers to [`Viewer::render`] once per step until it returns
/// [`Frame::Shutdown`].
pub struct Viewer<D: ParticleDelegate = PointSpriteDelegate> {
    event_loop: EventLoop<()>,
    state: ViewerState<D>,
}

impl<D: ParticleDelegate> Viewer<D> {
    /// Open the window and create all GPU resources.
    ///
    /// Any failure here is fatal; nothing is retried.
    #[instrument(level = "info", skip_all, fields(title = %config.title))]
    pub fn new(config: ViewerConfig, delegate_init: D::InitData) -> Result<Self, ViewerError> {
        let mut event_loop = EventLoop::new()?;
        let mut init = WindowInit {
            attributes: Some(config.window_attributes()),
            result: None,
        };
        // resumed() fires during the first pump on desktop platforms
        let _ = event_loop.pump_app_events(Some(INIT_TIMEOUT), &mut init);
        let window = Arc::new(init.result.ok_or(ViewerError::NoWindow)??);

        let gpu = GpuContext::new(window.clone())?;
        let (width, height) = gpu.size();
        info!("Framebuffer {}x{}", width, height);

        let camera = Camera::new(config.camera_position, config.camera_focus, width, height);
        let controls = Controls::new(camera, width, height);

        let delegate = D::create(gpu.renderer(), gpu.surface_format(), DEPTH_FORMAT, delegate_init)
            .map_err(|e| ViewerError::resource("particle delegate", e))?;
        let box_lines = BoxLines::new(gpu.renderer(), gpu.surface_format(), DEPTH_FORMAT)
            .map_err(|e| ViewerError::resource("bounding box renderer", e))?;
        box_lines.set_color(gpu.queue(), config.box_color);
        let gui = GuiOverlay::new(window, gpu.device(), gpu.surface_format());

        Ok(Self {
            event_loop,
            state: ViewerState {
                gpu,
                controls,
                gui,
                delegate,
                box_lines,
                bounds: BoundingBox::default(),
                params: FluidParams::default(),
                control: FrameControl::default(),
                clear_color: config.clear_color,
                point_radius: config.point_radius,
            },
        })
    }

    /// Draw one frame of `particles`.
    ///
    /// The buffers are only borrowed for this call. Returns
    /// [`Frame::Shutdown`] without drawing once a close was requested.
    pub fn render(&mut self, particles: ParticleBuffers<'_>) -> Result<Frame, ViewerError> {
        let state = &mut self.state;
        let _span = info_span!("frame", n = state.controls.input().frame_count()).entered();

        let queue = state.gpu.queue();
        state.box_lines.upload(queue, &state.bounds.line_vertices());

        let frame = state.controls.input().frame_count();
        state
            .gui
            .panel_mut()
            .refresh(&state.params, state.control.run(), frame);

        if let Some(shutdown) = state.control.shutdown() {
            return Ok(shutdown);
        }

        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state)
        {
            debug!("Event loop exited with {}", code);
            self.state.control.request_close();
        }

        self.state.draw(particles)
    }

    /// Corners of the wireframe box, in any order.
    pub fn set_limits(&mut self, upper: Vec3, lower: Vec3) {
        self.state.bounds = BoundingBox::new(upper, lower);
    }

    pub fn limits(&self) -> BoundingBox {
        self.state.bounds
    }

    /// Called once per "Next Frame" click or `N` press, whatever the run state.
    pub fn on_advance_frame(&mut self, callback: impl FnMut() + 'static) {
        self.state.control.set_on_advance(callback);
    }

    /// Ask the viewer to shut down; the next `render` returns [`Frame::Shutdown`].
    pub fn request_close(&mut self) {
        self.state.control.request_close();
    }

    pub fn params(&self) -> &FluidParams {
        &self.state.params
    }

    pub fn params_mut(&mut self) -> &mut FluidParams {
        &mut self.state.params
    }

    pub fn renderer(&self) -> &Renderer {
        self.state.gpu.renderer()
    }

    /// Device the particle buffers must be created on.
    pub fn device(&self) -> &wgpu::Device {
        self.state.gpu.device()
    }

    pub fn queue(&self) -> &wgpu::Queue {
        self.state.gpu.queue()
    }

    pub fn window(&self) -> &Arc<Window> {
        self.state.gpu.window()
    }

    pub fn camera(&self) -> &Camera {
        self.state.controls.camera()
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        self.state.controls.camera_mut()
    }

    pub fn run_state(&self) -> RunState {
        self.state.control.run().state
    }

    pub fn is_running(&self) -> bool {
        self.state.control.run().is_running()
    }

    pub fn set_running(&mut self, running: bool) {
        self.state.control.run_mut().set_running(running);
    }

    /// Opaque flag toggled from the panel. Its meaning is up to the driver.
    pub fn last_frame(&self) -> bool {
        self.state.control.run().last_frame
    }

    /// Particle id drawn highlighted, negative for none.
    pub fn highlight(&self) -> i32 {
        self.state.control.run().highlight
    }

    pub fn frame_count(&self) -> u64 {
        self.state.controls.input().frame_count()
    }

    pub fn delegate(&self) -> &D {
        &self.state.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.state.delegate
    }
}

impl<D: ParticleDelegate> ViewerState<D> {
    fn draw(&mut self, particles: ParticleBuffers<'_>) -> Result<Frame, ViewerError> {
        let shortcuts = self.control.sample(self.controls.input());
        let text = self.controls.input().text();
        if !text.is_empty() {
            debug!("Text input: {:?}", text);
        }

        let surface_texture = match self.gpu.surface().get_current_texture() {
            Ok(texture) => Some(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                None
            }
            Err(err @ wgpu::SurfaceError::OutOfMemory) => return Err(err.into()),
            Err(err) => {
                warn!("Skipping frame: {}", err);
                None
            }
        };

        let Some(surface_texture) = surface_texture else {
            self.control.finish(shortcuts, None);
            self.controls.end_frame();
            return Ok(Frame::Skipped);
        };

        let camera = self.controls.camera().uniforms();
        let shading = self.params.shading(self.point_radius, self.control.run().highlight);
        let device = self.gpu.device();
        let queue = self.gpu.queue();
        self.delegate.update(queue, &camera, &shading);
        self.box_lines.update_camera(queue, &camera);

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        let ctx = RenderContext {
            color_view: &view,
            depth_view: self.gpu.depth_view(),
            viewport: self.controls.viewport(),
            clear_color: self.clear_color,
        };
        self.delegate.render(&mut encoder, &ctx, &particles);
        self.box_lines.render(&mut encoder, &ctx);

        let (output, response) = self.gui.run();
        let (width, height) = self.gpu.size();
        let gui_buffers = self
            .gui
            .render(device, queue, &mut encoder, &view, [width, height], output);

        self.apply_panel(response, shortcuts);

        self.gpu
            .queue()
            .submit(gui_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        self.gpu.window().pre_present_notify();
        surface_texture.present();

        self.controls.end_frame();
        Ok(Frame::Presented)
    }

    /// Copy panel edits back into the store, then apply this frame's run
    /// shortcuts and advance request.
    fn apply_panel(&mut self, response: PanelResponse, shortcuts: Shortcuts) {
        let panel = self.gui.panel();
        if response.params_changed {
            self.params.clone_from(panel.params());
            self.params.clamp_rendering();
        }
        self.control.finish(shortcuts, Some((response, panel.run())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_opens_fluid_window() {
        let config = ViewerConfig::default();
        assert_eq!(config.title, "Fluid");
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.camera_focus, Vec3::ZERO);
        assert_eq!(config.box_color, DEFAULT_LINE_COLOR);
    }

    #[test]
    fn config_builders_override_defaults() {
        let config = ViewerConfig::default()
            .with_title("Dam break")
            .with_size(1024, 768)
            .with_camera(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE)
            .with_box_color([1.0, 0.0, 0.0, 1.0])
            .with_point_radius(0.25);
        assert_eq!(config.title, "Dam break");
        assert_eq!((config.width, config.height), (1024, 768));
        assert_eq!(config.camera_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.point_radius, 0.25);
        assert_eq!(config.box_color, [1.0, 0.0, 0.0, 1.0]);
    }
}
