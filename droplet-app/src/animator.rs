//! Stand-in for a fluid solver: a block of particles that falls and bounces
//! inside the domain. Enough to exercise the viewer, nothing more.

use droplet_window::FluidParams;
use glam::Vec3;

/// Fraction of velocity kept after hitting a wall.
const RESTITUTION: f32 = 0.5;

pub struct ParticleBlock {
    positions: Vec<[f32; 3]>,
    velocities: Vec<Vec3>,
    ids: Vec<u32>,
    lower: Vec3,
    upper: Vec3,
    steps: u64,
}

impl ParticleBlock {
    /// Lay out `count` particles on a cubic grid in the upper half of the box.
    pub fn new(count: u32, lower: Vec3, upper: Vec3) -> Self {
        let (lower, upper) = (lower.min(upper), lower.max(upper));
        let side = (count as f32).cbrt().ceil().max(1.0) as u32;
        let extent = upper - lower;
        let origin = lower + extent * Vec3::new(0.25, 0.5, 0.25);
        let spacing = extent * Vec3::new(0.5, 0.45, 0.5) / side as f32;

        let positions: Vec<[f32; 3]> = (0..count)
            .map(|i| {
                let cell = Vec3::new(
                    (i % side) as f32,
                    (i / (side * side)) as f32,
                    ((i / side) % side) as f32,
                );
                (origin + (cell + 0.5) * spacing).to_array()
            })
            .collect();

        Self {
            velocities: vec![Vec3::ZERO; positions.len()],
            ids: (0..count).collect(),
            positions,
            lower,
            upper,
            steps: 0,
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance by `params.dt` under gravity `params.g`. With `reverse` the
    /// step runs backwards in time.
    pub fn step(&mut self, params: &FluidParams, reverse: bool) {
        let dt = if reverse { -params.dt } else { params.dt };
        let gravity = Vec3::new(0.0, -params.g, 0.0);

        for (p, v) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *v += gravity * dt;
            let mut pos = Vec3::from_array(*p) + *v * dt;
            for axis in 0..3 {
                if pos[axis] < self.lower[axis] {
                    pos[axis] = self.lower[axis];
                    v[axis] = -v[axis] * RESTITUTION;
                } else if pos[axis] > self.upper[axis] {
                    pos[axis] = self.upper[axis];
                    v[axis] = -v[axis] * RESTITUTION;
                }
            }
            *p = pos.to_array();
        }
        self.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> ParticleBlock {
        ParticleBlock::new(100, Vec3::splat(-4.0), Vec3::splat(4.0))
    }

    #[test]
    fn lays_out_requested_count_with_sequential_ids() {
        let block = block();
        assert_eq!(block.len(), 100);
        assert_eq!(block.ids()[0], 0);
        assert_eq!(block.ids()[99], 99);
    }

    #[test]
    fn initial_layout_is_inside_the_box() {
        let block = block();
        for p in block.positions() {
            let p = Vec3::from_array(*p);
            assert!(p.cmpge(Vec3::splat(-4.0)).all() && p.cmple(Vec3::splat(4.0)).all());
        }
    }

    #[test]
    fn particles_fall_and_stay_in_bounds() {
        let mut block = block();
        let params = FluidParams::default();
        let start_y = block.positions()[0][1];
        for _ in 0..2000 {
            block.step(&params, false);
        }
        assert_eq!(block.steps(), 2000);
        assert!(block.positions()[0][1] < start_y);
        for p in block.positions() {
            let p = Vec3::from_array(*p);
            assert!(p.cmpge(Vec3::splat(-4.0)).all() && p.cmple(Vec3::splat(4.0)).all());
        }
    }

    #[test]
    fn reverse_step_returns_close_to_start() {
        let mut block = block();
        let params = FluidParams::default();
        let start = block.positions()[0];
        block.step(&params, false);
        block.step(&params, true);
        let end = block.positions()[0];
        assert!((Vec3::from_array(start) - Vec3::from_array(end)).length() < 1e-3);
    }
}
