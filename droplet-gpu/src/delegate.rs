//! Particle render delegate trait and the borrowed inputs it draws from.
//!
//! The solver owns the particle buffers; the viewer only borrows them for the
//! duration of one frame and hands them to a [`ParticleDelegate`], which is
//! the seam where a screen-space fluid renderer (or the bundled point-sprite
//! renderer) plugs in.

use crate::{CameraUniforms, Renderer, ShadingParams};
use std::error::Error;

/// Stride of one position entry (`vec3<f32>`).
pub const POSITION_STRIDE: u64 = 12;
/// Stride of one id entry (`u32`).
pub const ID_STRIDE: u64 = 4;

/// Solver-owned particle attributes, borrowed for a single render call.
///
/// Positions are tightly packed `vec3<f32>`, ids are `u32`. The lifetime ties
/// the handles to the call that supplied them; nothing in the viewer keeps
/// them past that call.
#[derive(Clone, Copy, Debug)]
pub struct ParticleBuffers<'a> {
    pub positions: &'a wgpu::Buffer,
    pub ids: &'a wgpu::Buffer,
    pub count: u32,
}

impl<'a> ParticleBuffers<'a> {
    pub fn new(positions: &'a wgpu::Buffer, ids: &'a wgpu::Buffer, count: u32) -> Self {
        Self {
            positions,
            ids,
            count,
        }
    }

    /// Number of particles that fit in both buffers, capped at `count`.
    pub fn drawable_count(&self) -> u32 {
        let by_positions = self.positions.size() / POSITION_STRIDE;
        let by_ids = self.ids.size() / ID_STRIDE;
        let capacity = by_positions.min(by_ids).min(u32::MAX as u64) as u32;
        self.count.min(capacity)
    }

    /// Vertex layouts for slot 0 (positions) and slot 1 (ids), one entry per instance.
    pub fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
        const POSITION_ATTRS: [wgpu::VertexAttribute; 1] =
            wgpu::vertex_attr_array![0 => Float32x3];
        const ID_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Uint32];
        [
            wgpu::VertexBufferLayout {
                array_stride: POSITION_STRIDE,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &POSITION_ATTRS,
            },
            wgpu::VertexBufferLayout {
                array_stride: ID_STRIDE,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &ID_ATTRS,
            },
        ]
    }

    /// Bind both buffers as vertex sources on `pass`. No data is copied.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.ids.slice(..));
    }
}

/// Framebuffer region (in physical pixels) the frame is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Context passed to the render delegate for rendering.
pub struct RenderContext<'a> {
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: &'a wgpu::TextureView,
    pub viewport: ViewportRect,
    pub clear_color: wgpu::Color,
}

impl RenderContext<'_> {
    pub fn apply_viewport(&self, pass: &mut wgpu::RenderPass<'_>) {
        let vp = self.viewport;
        pass.set_viewport(
            vp.x as f32,
            vp.y as f32,
            vp.width as f32,
            vp.height as f32,
            0.0,
            1.0,
        );
    }
}

/// Draws particles from borrowed buffers. Implement this to swap in a
/// different shading technique.
pub trait ParticleDelegate: Sized {
    /// Data needed to construct the delegate.
    type InitData;

    /// Create GPU resources for rendering.
    fn create(
        renderer: &Renderer,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        init_data: Self::InitData,
    ) -> Result<Self, Box<dyn Error>>;

    /// Update uniforms for the coming frame.
    fn update(&mut self, queue: &wgpu::Queue, camera: &CameraUniforms, shading: &ShadingParams);

    /// Record the particle pass. This is the first pass of the frame and must
    /// clear both color and depth.
    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &RenderContext<'_>,
        particles: &ParticleBuffers<'_>,
    );
}
