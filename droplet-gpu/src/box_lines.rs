//! Wireframe for the simulation domain.

use crate::pipeline::depth_state;
use crate::{
    BufferUsage, CameraUniforms, LineUniforms, RenderContext, RenderPipelineBuilder, Renderer,
};
use std::error::Error;

/// Edges of an axis-aligned box.
pub const BOX_EDGE_COUNT: usize = 12;
/// Line-list vertices, two per edge.
pub const BOX_VERTEX_COUNT: usize = BOX_EDGE_COUNT * 2;

const VERTEX_STRIDE: u64 = 3 * std::mem::size_of::<f32>() as u64;
const BOX_BUFFER_SIZE: u64 = BOX_VERTEX_COUNT as u64 * VERTEX_STRIDE;

pub const DEFAULT_LINE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// GPU side of the box wireframe: a fixed 24-vertex buffer plus the line
/// pipeline that draws it over the particle pass.
pub struct BoxLines {
    vertex_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl BoxLines {
    pub fn new(
        renderer: &Renderer,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Result<Self, Box<dyn Error>> {
        let device = renderer.device();

        let vertex_buffer = renderer
            .create_buffer()
            .label("Box Vertex Buffer")
            .size(BOX_BUFFER_SIZE)
            .usage(BufferUsage::Vertex)
            .build()?;

        let camera_buffer = renderer
            .create_buffer()
            .label("Box Camera Buffer")
            .with_pod_data(&[CameraUniforms::default()])
            .usage(BufferUsage::Uniform)
            .build()?;

        let line_buffer = renderer
            .create_buffer()
            .label("Box Line Buffer")
            .with_pod_data(&[LineUniforms {
                color: DEFAULT_LINE_COLOR,
            }])
            .usage(BufferUsage::Uniform)
            .build()?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Box Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Box Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: line_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("box_lines_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::BOX_LINES.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Box Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        let pipeline = RenderPipelineBuilder::new(device)
            .with_label("Box Lines Pipeline")
            .with_shader(&shader)
            .with_layout(pipeline_layout)
            .with_vertex_buffer(wgpu::VertexBufferLayout {
                array_stride: VERTEX_STRIDE,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &ATTRS,
            })
            .with_topology(wgpu::PrimitiveTopology::LineList)
            .with_fragment_target(Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            }))
            .with_depth_stencil(depth_state(depth_format, false))
            .build()?;

        Ok(Self {
            vertex_buffer,
            camera_buffer,
            line_buffer,
            bind_group,
            pipeline,
        })
    }

    /// Overwrite the 24 line vertices in place. The buffer is never reallocated.
    pub fn upload(&self, queue: &wgpu::Queue, vertices: &[[f32; 3]; BOX_VERTEX_COUNT]) {
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &CameraUniforms) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
    }

    pub fn set_color(&self, queue: &wgpu::Queue, color: [f32; 4]) {
        queue.write_buffer(&self.line_buffer, 0, bytemuck::bytes_of(&LineUniforms { color }));
    }

    /// Draw the wireframe on top of what the particle pass left behind.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, ctx: &RenderContext<'_>) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Box Lines Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        ctx.apply_viewport(&mut render_pass);
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..BOX_VERTEX_COUNT as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_buffer_holds_24_vec3() {
        assert_eq!(BOX_VERTEX_COUNT, 24);
        assert_eq!(BOX_BUFFER_SIZE, 288);
        let vertices = [[0.0f32; 3]; BOX_VERTEX_COUNT];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len() as u64, BOX_BUFFER_SIZE);
    }
}
