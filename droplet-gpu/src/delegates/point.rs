//! Point-sprite particle delegate.

use crate::pipeline::depth_state;
use crate::{
    BufferUsage, CameraUniforms, ParticleBuffers, ParticleDelegate, RenderContext,
    RenderPipelineBuilder, Renderer, ShadingParams, SpriteUniforms,
};
use std::error::Error;
use tracing::info;

/// Initialization data for point-sprite rendering.
#[derive(Debug, Clone, Copy)]
pub struct PointInitData {
    /// Base particle color (linear rgba).
    pub color: [f32; 4],
}

impl PointInitData {
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

impl Default for PointInitData {
    fn default() -> Self {
        Self {
            color: [0.15, 0.45, 0.9, 1.0],
        }
    }
}

/// Draws every particle as a camera-facing quad shaded like a sphere.
pub struct PointSpriteDelegate {
    color: [f32; 4],
    camera_buffer: wgpu::Buffer,
    sprite_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl ParticleDelegate for PointSpriteDelegate {
    type InitData = PointInitData;

    fn create(
        renderer: &Renderer,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        init_data: Self::InitData,
    ) -> Result<Self, Box<dyn Error>> {
        let device = renderer.device();

        let camera_buffer = renderer
            .create_buffer()
            .label("Particle Camera Buffer")
            .with_pod_data(&[CameraUniforms::default()])
            .usage(BufferUsage::Uniform)
            .build()?;

        let sprite_buffer = renderer
            .create_buffer()
            .label("Sprite Buffer")
            .with_pod_data(&[SpriteUniforms::new(&ShadingParams::default(), init_data.color)])
            .usage(BufferUsage::Uniform)
            .build()?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                uniform_entry(1, wgpu::ShaderStages::VERTEX_FRAGMENT),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sprite_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particle_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::PARTICLE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let [positions, ids] = ParticleBuffers::vertex_layouts();
        let pipeline = RenderPipelineBuilder::new(device)
            .with_label("Point Sprite Pipeline")
            .with_shader(&shader)
            .with_layout(pipeline_layout)
            .with_vertex_buffer(positions)
            .with_vertex_buffer(ids)
            .with_topology(wgpu::PrimitiveTopology::TriangleList)
            .with_fragment_target(Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            }))
            .with_depth_stencil(depth_state(depth_format, true))
            .build()?;

        info!("Point sprite delegate ready ({:?})", surface_format);

        Ok(Self {
            color: init_data.color,
            camera_buffer,
            sprite_buffer,
            bind_group,
            pipeline,
        })
    }

    fn update(&mut self, queue: &wgpu::Queue, camera: &CameraUniforms, shading: &ShadingParams) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
        let sprite = SpriteUniforms::new(shading, self.color);
        queue.write_buffer(&self.sprite_buffer, 0, bytemuck::bytes_of(&sprite));
    }

    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &RenderContext<'_>,
        particles: &ParticleBuffers<'_>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Particle Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let count = particles.drawable_count();
        if count == 0 {
            return;
        }

        ctx.apply_viewport(&mut render_pass);
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        particles.bind(&mut render_pass);
        // 6 vertices per particle (two triangles covering the quad)
        render_pass.draw(0..6, 0..count);
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
