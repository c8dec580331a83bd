//! Builder API for creating GPU buffers
//!
//! Wraps the two wgpu creation paths (sized vs. initialized) behind one
//! builder so callers never pick usage flags by hand.

/// Buffer usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex buffer rewritten from the CPU every frame
    Vertex,
    /// Uniform buffer
    Uniform,
    /// Particle attribute buffer: bindable as vertex input and as storage so
    /// a compute solver can write it in place
    Particle,
}

impl BufferUsage {
    fn to_wgpu(self) -> wgpu::BufferUsages {
        match self {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            BufferUsage::Particle => {
                wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
            }
        }
    }
}

/// Builder for creating GPU buffers
pub struct BufferBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<String>,
    size: Option<u64>,
    data: Option<&'a [u8]>,
    usage: BufferUsage,
}

impl<'a> BufferBuilder<'a> {
    pub(crate) fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            label: None,
            size: None,
            data: None,
            usage: BufferUsage::Vertex,
        }
    }

    /// Set the buffer label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set buffer size (for empty buffers)
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set buffer data from a slice of Pod types
    pub fn with_pod_data<T: bytemuck::Pod>(mut self, data: &'a [T]) -> Self {
        self.data = Some(bytemuck::cast_slice(data));
        self
    }

    /// Set buffer usage
    pub fn usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn build(self) -> Result<wgpu::Buffer, BufferBuildError> {
        use wgpu::util::DeviceExt;

        match (self.data, self.size) {
            (Some(data), _) if data.is_empty() => Err(BufferBuildError::Empty),
            (Some(data), _) => Ok(self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: self.label.as_deref(),
                    contents: data,
                    usage: self.usage.to_wgpu(),
                })),
            (None, Some(0)) => Err(BufferBuildError::Empty),
            (None, Some(size)) => Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: self.label.as_deref(),
                size,
                usage: self.usage.to_wgpu(),
                mapped_at_creation: false,
            })),
            (None, None) => Err(BufferBuildError::MissingSizeOrData),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BufferBuildError {
    #[error("Buffer must have either size or data")]
    MissingSizeOrData,
    #[error("Buffer would be zero-sized")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_usage_conversion() {
        assert!(BufferUsage::Vertex.to_wgpu().contains(wgpu::BufferUsages::VERTEX));
        assert!(BufferUsage::Vertex.to_wgpu().contains(wgpu::BufferUsages::COPY_DST));
        assert!(BufferUsage::Uniform.to_wgpu().contains(wgpu::BufferUsages::UNIFORM));
        assert!(BufferUsage::Uniform.to_wgpu().contains(wgpu::BufferUsages::COPY_DST));
        assert!(!BufferUsage::Uniform.to_wgpu().contains(wgpu::BufferUsages::VERTEX));
    }

    #[test]
    fn test_particle_usage_is_vertex_and_storage() {
        let usage = BufferUsage::Particle.to_wgpu();
        assert!(usage.contains(wgpu::BufferUsages::VERTEX));
        assert!(usage.contains(wgpu::BufferUsages::STORAGE));
        assert!(usage.contains(wgpu::BufferUsages::COPY_DST));
    }
}
