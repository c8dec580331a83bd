/// Builder for creating render pipelines
pub struct RenderPipelineBuilder<'a> {
    device: &'a wgpu::Device,
    vertex_shader: Option<&'a wgpu::ShaderModule>,
    fragment_shader: Option<&'a wgpu::ShaderModule>,
    label: Option<String>,
    layout: Option<wgpu::PipelineLayout>,
    vertex_buffers: Vec<wgpu::VertexBufferLayout<'static>>,
    primitive: Option<wgpu::PrimitiveState>,
    depth_stencil: Option<wgpu::DepthStencilState>,
    fragment_targets: Vec<Option<wgpu::ColorTargetState>>,
}

impl<'a> RenderPipelineBuilder<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            vertex_shader: None,
            fragment_shader: None,
            label: None,
            layout: None,
            vertex_buffers: Vec::new(),
            primitive: None,
            depth_stencil: None,
            fragment_targets: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_vertex_shader(mut self, shader: &'a wgpu::ShaderModule) -> Self {
        self.vertex_shader = Some(shader);
        self
    }

    pub fn with_fragment_shader(mut self, shader: &'a wgpu::ShaderModule) -> Self {
        self.fragment_shader = Some(shader);
        self
    }

    /// Use one module for both stages (`vs_main` / `fs_main`).
    pub fn with_shader(self, shader: &'a wgpu::ShaderModule) -> Self {
        self.with_vertex_shader(shader).with_fragment_shader(shader)
    }

    pub fn with_layout(mut self, layout: wgpu::PipelineLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_vertex_buffer(mut self, buffer: wgpu::VertexBufferLayout<'static>) -> Self {
        self.vertex_buffers.push(buffer);
        self
    }

    pub fn with_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.primitive = Some(primitive_state(topology));
        self
    }

    pub fn with_depth_stencil(mut self, depth_stencil: wgpu::DepthStencilState) -> Self {
        self.depth_stencil = Some(depth_stencil);
        self
    }

    pub fn with_fragment_target(mut self, target: Option<wgpu::ColorTargetState>) -> Self {
        self.fragment_targets.push(target);
        self
    }

    pub fn build(self) -> Result<wgpu::RenderPipeline, PipelineBuildError> {
        let vertex_shader = self
            .vertex_shader
            .ok_or(PipelineBuildError::MissingVertexShader)?;
        if self.fragment_shader.is_some() && self.fragment_targets.is_empty() {
            return Err(PipelineBuildError::MissingFragmentTarget);
        }

        let pipeline_layout = self.layout.unwrap_or_else(|| {
            self.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: None,
                    bind_group_layouts: &[],
                    push_constant_ranges: &[],
                })
        });

        Ok(self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: self.label.as_deref(),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: vertex_shader,
                    entry_point: Some("vs_main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &self.vertex_buffers,
                },
                primitive: self
                    .primitive
                    .unwrap_or_else(|| primitive_state(wgpu::PrimitiveTopology::TriangleList)),
                depth_stencil: self.depth_stencil,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                fragment: self.fragment_shader.map(|shader| wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &self.fragment_targets,
                }),
                multiview: None,
                cache: None,
            }))
    }
}

/// Unculled, filled primitive state for the given topology.
fn primitive_state(topology: wgpu::PrimitiveTopology) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        unclipped_depth: false,
        polygon_mode: wgpu::PolygonMode::Fill,
        conservative: false,
    }
}

/// Depth test state shared by the particle and wireframe pipelines.
pub(crate) fn depth_state(format: wgpu::TextureFormat, write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineBuildError {
    #[error("Vertex shader is required")]
    MissingVertexShader,
    #[error("Fragment shader given without a color target")]
    MissingFragmentTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_state_is_unculled() {
        let state = primitive_state(wgpu::PrimitiveTopology::LineList);
        assert_eq!(state.topology, wgpu::PrimitiveTopology::LineList);
        assert_eq!(state.cull_mode, None);
        assert_eq!(state.polygon_mode, wgpu::PolygonMode::Fill);
    }

    #[test]
    fn test_depth_state_compare_less() {
        let state = depth_state(crate::DEPTH_FORMAT, false);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
        assert!(!state.depth_write_enabled);
        assert_eq!(state.format, wgpu::TextureFormat::Depth24PlusStencil8);
    }
}
