//! Interactive viewer for particle fluid simulations.
//!
//! [`Viewer`] owns the window, the GPU context and a single set of
//! [`Controls`]. A driver steps its solver and calls [`Viewer::render`] with
//! the particle buffers once per step.

pub mod bounds;
pub mod camera;
mod context;
pub mod controls;
mod error;
mod frame_control;
pub mod input;
pub mod overlay;
pub mod params;
pub mod run_control;
mod viewer;

pub use bounds::BoundingBox;
pub use camera::Camera;
pub use context::GpuContext;
pub use controls::{Controls, Dispatch, NoOverlay, Overlay};
pub use error::ViewerError;
pub use frame_control::Frame;
pub use input::{ButtonState, InputEvent, InputState};
pub use overlay::{GuiOverlay, PanelResponse, ParameterPanel};
pub use params::FluidParams;
pub use run_control::{EdgeTrigger, RunControl, RunState, Shortcuts};
pub use viewer::{Viewer, ViewerConfig};
