use glam::{Mat4, Vec3};

/// Shared camera uniform layout between host and shader.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniforms {
    pub view_matrix: [[f32; 4]; 4],
    pub proj_matrix: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniforms {
    pub fn from_matrices(view: Mat4, proj: Mat4, eye: Vec3) -> Self {
        Self {
            view_matrix: view.to_cols_array_2d(),
            proj_matrix: proj.to_cols_array_2d(),
            view_pos: eye.to_array(),
            _padding: 0.0,
        }
    }
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self::from_matrices(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO)
    }
}

/// Per-frame inputs for particle shading, filled from the parameter store.
///
/// The smoothing fields are only meaningful to screen-space fluid delegates;
/// the point-sprite delegate uses the radius and highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingParams {
    pub point_radius: f32,
    /// Particle id drawn in the highlight color, negative for none.
    pub highlight: i32,
    pub smooth_iterations: u32,
    pub kernel_radius: u32,
    pub sigma_r: f32,
    pub sigma_z: f32,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            point_radius: 0.1,
            highlight: -1,
            smooth_iterations: 4,
            kernel_radius: 10,
            sigma_r: 6.0,
            sigma_z: 0.1,
        }
    }
}

/// Uniform block for `particle.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct SpriteUniforms {
    pub radius: f32,
    pub highlight: i32,
    pub _padding: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteUniforms {
    pub fn new(shading: &ShadingParams, color: [f32; 4]) -> Self {
        Self {
            radius: shading.point_radius,
            highlight: shading.highlight,
            _padding: [0.0; 2],
            color,
        }
    }
}

/// Uniform block for `box_lines.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct LineUniforms {
    pub color: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_uniforms_match_wgsl_layout() {
        // mat4 + mat4 + vec3 padded to 16 bytes
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 144);
        assert_eq!(std::mem::size_of::<SpriteUniforms>(), 32);
        assert_eq!(std::mem::size_of::<LineUniforms>(), 16);
    }

    #[test]
    fn camera_uniforms_store_columns() {
        let view = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let uniforms = CameraUniforms::from_matrices(view, Mat4::IDENTITY, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(uniforms.view_matrix[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniforms.view_pos, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn sprite_uniforms_copy_shading() {
        let shading = ShadingParams {
            point_radius: 0.5,
            highlight: 7,
            ..Default::default()
        };
        let sprite = SpriteUniforms::new(&shading, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(sprite.radius, 0.5);
        assert_eq!(sprite.highlight, 7);
    }
}
