use droplet_gpu::ShadingParams;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const SMOOTH_NITER_RANGE: RangeInclusive<u32> = 0..=60;
pub const KERNEL_R_RANGE: RangeInclusive<u32> = 0..=20;
pub const SIGMA_R_RANGE: RangeInclusive<f32> = 0.0..=10.0;
pub const SIGMA_Z_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Solver and rendering parameters shared between the panel and the driver.
///
/// The viewer only displays and edits these values; their meaning belongs to
/// the solver and the fluid delegate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidParams {
    /// Solver iterations per step.
    pub niter: u32,
    /// Rest density.
    pub pho0: f32,
    /// Gravity.
    pub g: f32,
    /// Kernel radius.
    pub h: f32,
    /// Timestep.
    pub dt: f32,
    pub lambda_eps: f32,
    pub delta_q: f32,
    pub k_corr: f32,
    pub n_corr: f32,
    /// Boundary density.
    pub k_boundary: f32,
    /// XSPH viscosity.
    pub c_xsph: f32,

    pub smooth_niter: u32,
    pub kernel_r: u32,
    pub sigma_r: f32,
    pub sigma_z: f32,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            niter: 4,
            pho0: 1000.0,
            g: 9.8,
            h: 1.1,
            dt: 0.0083,
            lambda_eps: 1000.0,
            delta_q: 0.3,
            k_corr: 0.001,
            n_corr: 4.0,
            k_boundary: 10.0,
            c_xsph: 0.5,
            smooth_niter: 4,
            kernel_r: 10,
            sigma_r: 6.0,
            sigma_z: 0.1,
        }
    }
}

impl FluidParams {
    /// Pull the rendering fields back into their panel ranges.
    pub fn clamp_rendering(&mut self) {
        self.smooth_niter = self
            .smooth_niter
            .clamp(*SMOOTH_NITER_RANGE.start(), *SMOOTH_NITER_RANGE.end());
        self.kernel_r = self
            .kernel_r
            .clamp(*KERNEL_R_RANGE.start(), *KERNEL_R_RANGE.end());
        self.sigma_r = self
            .sigma_r
            .clamp(*SIGMA_R_RANGE.start(), *SIGMA_R_RANGE.end());
        self.sigma_z = self
            .sigma_z
            .clamp(*SIGMA_Z_RANGE.start(), *SIGMA_Z_RANGE.end());
    }

    /// Shading inputs for the particle delegate.
    pub fn shading(&self, point_radius: f32, highlight: i32) -> ShadingParams {
        ShadingParams {
            point_radius,
            highlight,
            smooth_iterations: self.smooth_niter,
            kernel_radius: self.kernel_r,
            sigma_r: self.sigma_r,
            sigma_z: self.sigma_z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let params: FluidParams = serde_json::from_str(r#"{ "niter": 8, "sigma_z": 0.5 }"#).unwrap();
        assert_eq!(params.niter, 8);
        assert_eq!(params.sigma_z, 0.5);
        assert_eq!(params.pho0, 1000.0);
        assert_eq!(params.kernel_r, 10);
    }

    #[test]
    fn json_round_trip() {
        let params = FluidParams {
            dt: 0.004,
            ..Default::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: FluidParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn clamp_rendering_limits_ranges() {
        let mut params = FluidParams {
            smooth_niter: 99,
            kernel_r: 50,
            sigma_r: -1.0,
            sigma_z: 2.0,
            ..Default::default()
        };
        params.clamp_rendering();
        assert_eq!(params.smooth_niter, 60);
        assert_eq!(params.kernel_r, 20);
        assert_eq!(params.sigma_r, 0.0);
        assert_eq!(params.sigma_z, 1.0);
        // solver fields are left alone
        assert_eq!(params.niter, 4);
    }

    #[test]
    fn shading_copies_rendering_fields() {
        let params = FluidParams::default();
        let shading = params.shading(0.3, 5);
        assert_eq!(shading.point_radius, 0.3);
        assert_eq!(shading.highlight, 5);
        assert_eq!(shading.smooth_iterations, 4);
        assert_eq!(shading.kernel_radius, 10);
    }
}
