use droplet_gpu::ViewportRect;
use glam::Vec2;
use tracing::debug;
use winit::event::{MouseButton, WindowEvent};

use crate::camera::Camera;
use crate::input::{ButtonState, InputEvent, InputState};

/// Something drawn over the scene that gets first refusal on window events.
pub trait Overlay {
    /// Return true if the overlay consumed the event.
    fn on_event(&mut self, event: &WindowEvent) -> bool;
}

/// Overlay that never consumes anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOverlay;

impl Overlay for NoOverlay {
    fn on_event(&mut self, _event: &WindowEvent) -> bool {
        false
    }
}

/// Outcome of routing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The overlay took the event; input and camera are untouched.
    Consumed,
    /// Input state and/or camera were updated.
    Applied,
    /// Viewport and camera aspect now match the new framebuffer size.
    Resized(ViewportRect),
    /// The window asked to close.
    CloseRequested,
    Ignored,
}

/// The single controller for a viewer: input snapshot, camera and viewport.
#[derive(Debug)]
pub struct Controls {
    input: InputState,
    camera: Camera,
    viewport: ViewportRect,
}

impl Controls {
    pub fn new(camera: Camera, width: u32, height: u32) -> Self {
        let mut controls = Self {
            input: InputState::default(),
            camera,
            viewport: ViewportRect {
                x: 0,
                y: 0,
                width: width.max(1),
                height: height.max(1),
            },
        };
        controls.camera.set_viewport_size(width, height);
        controls
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn viewport(&self) -> ViewportRect {
        self.viewport
    }

    /// Route one window event. The overlay sees it first; resizes are applied
    /// even when the overlay also handles them so the framebuffer never goes
    /// out of sync with the camera.
    pub fn dispatch(&mut self, event: &WindowEvent, overlay: &mut dyn Overlay) -> Dispatch {
        if matches!(event, WindowEvent::CloseRequested) {
            return Dispatch::CloseRequested;
        }

        let consumed = overlay.on_event(event);
        match InputEvent::from_window_event(event) {
            Some(input @ InputEvent::Resized { .. }) => self.apply(input),
            Some(_) if consumed => Dispatch::Consumed,
            Some(input) => self.apply(input),
            None if consumed => Dispatch::Consumed,
            None => Dispatch::Ignored,
        }
    }

    /// Apply a translated event to input state and camera.
    pub fn apply(&mut self, event: InputEvent) -> Dispatch {
        match event {
            InputEvent::Resized { width, height } => match self.resize(width, height) {
                Some(viewport) => Dispatch::Resized(viewport),
                None => Dispatch::Ignored,
            },
            InputEvent::PointerMoved(position) => {
                self.input.record_pointer(position);
                let delta = self.input.take_mouse_delta();
                self.drag(delta);
                Dispatch::Applied
            }
            InputEvent::Button { button, state } => {
                if self.input.record_button(button, state) {
                    Dispatch::Applied
                } else {
                    Dispatch::Ignored
                }
            }
            InputEvent::Scroll(amount) => {
                self.camera.zoom(amount);
                Dispatch::Applied
            }
            InputEvent::Key { key, state, repeat } => {
                self.input.record_key(key, state, repeat);
                Dispatch::Applied
            }
            InputEvent::Text(text) => {
                self.input.record_text(&text);
                Dispatch::Applied
            }
        }
    }

    /// Update viewport and camera aspect together. Zero-sized (minimized)
    /// framebuffers are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> Option<ViewportRect> {
        if width == 0 || height == 0 {
            debug!("Ignoring zero-sized resize {}x{}", width, height);
            return None;
        }
        self.viewport = ViewportRect {
            x: 0,
            y: 0,
            width,
            height,
        };
        self.camera.set_viewport_size(width, height);
        Some(self.viewport)
    }

    /// Orbit while the left button is held, pan while the right one is.
    fn drag(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        if self.input.button(MouseButton::Left) == ButtonState::Down {
            self.camera.orbit(delta);
        }
        if self.input.button(MouseButton::Right) == ButtonState::Down {
            self.camera.pan(delta);
        }
    }

    pub fn end_frame(&mut self) {
        self.input.end_frame();
    }
}
