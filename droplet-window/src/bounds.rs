//! Axis-aligned simulation domain and its wireframe.

use droplet_gpu::{BOX_EDGE_COUNT, BOX_VERTEX_COUNT};
use glam::Vec3;

/// Simulation domain given by two opposite corners in any order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
}

impl BoundingBox {
    pub fn new(upper: Vec3, lower: Vec3) -> Self {
        Self {
            min: upper.min(lower),
            max: upper.max(lower),
        }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// The 12 box edges: four along x, then four along y, then four along z.
    pub fn edges(&self) -> [[Vec3; 2]; BOX_EDGE_COUNT] {
        let (lo, hi) = (self.min, self.max);
        let corner = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        [
            // along x
            [corner(lo.x, lo.y, lo.z), corner(hi.x, lo.y, lo.z)],
            [corner(lo.x, lo.y, hi.z), corner(hi.x, lo.y, hi.z)],
            [corner(lo.x, hi.y, lo.z), corner(hi.x, hi.y, lo.z)],
            [corner(lo.x, hi.y, hi.z), corner(hi.x, hi.y, hi.z)],
            // along y
            [corner(lo.x, lo.y, lo.z), corner(lo.x, hi.y, lo.z)],
            [corner(lo.x, lo.y, hi.z), corner(lo.x, hi.y, hi.z)],
            [corner(hi.x, lo.y, lo.z), corner(hi.x, hi.y, lo.z)],
            [corner(hi.x, lo.y, hi.z), corner(hi.x, hi.y, hi.z)],
            // along z
            [corner(lo.x, lo.y, lo.z), corner(lo.x, lo.y, hi.z)],
            [corner(lo.x, hi.y, lo.z), corner(lo.x, hi.y, hi.z)],
            [corner(hi.x, lo.y, lo.z), corner(hi.x, lo.y, hi.z)],
            [corner(hi.x, hi.y, lo.z), corner(hi.x, hi.y, hi.z)],
        ]
    }

    /// Edge endpoints flattened into line-list order, ready for upload.
    pub fn line_vertices(&self) -> [[f32; 3]; BOX_VERTEX_COUNT] {
        let mut out = [[0.0; 3]; BOX_VERTEX_COUNT];
        for (i, [a, b]) in self.edges().into_iter().enumerate() {
            out[2 * i] = a.to_array();
            out[2 * i + 1] = b.to_array();
        }
        out
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(Vec3::ONE, -Vec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: Vec3) -> [i32; 3] {
        (v * 1000.0).round().as_ivec3().to_array()
    }

    #[test]
    fn corner_order_does_not_matter() {
        let a = BoundingBox::new(Vec3::ONE, -Vec3::ONE);
        let b = BoundingBox::new(-Vec3::ONE, Vec3::ONE);
        assert_eq!(a, b);
        assert_eq!(a.line_vertices(), b.line_vertices());
    }

    #[test]
    fn mixed_corners_normalize_per_axis() {
        let bb = BoundingBox::new(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(bb.min(), Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bb.max(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn unit_box_has_twelve_edges_of_length_two() {
        let bb = BoundingBox::new(Vec3::ONE, -Vec3::ONE);
        let edges = bb.edges();
        assert_eq!(edges.len(), 12);

        let mut corners = std::collections::HashSet::new();
        let mut unique_edges = std::collections::HashSet::new();
        for [a, b] in edges {
            assert!(((a - b).length() - 2.0).abs() < 1e-6);
            corners.insert(key(a));
            corners.insert(key(b));
            let (ka, kb) = (key(a), key(b));
            unique_edges.insert(if ka < kb { (ka, kb) } else { (kb, ka) });
        }
        assert_eq!(corners.len(), 8);
        assert_eq!(unique_edges.len(), 12);
    }

    #[test]
    fn edges_are_grouped_by_axis() {
        let bb = BoundingBox::new(Vec3::new(2.0, 3.0, 4.0), Vec3::ZERO);
        let edges = bb.edges();
        for (i, [a, b]) in edges.iter().enumerate() {
            let d = *b - *a;
            let expected = match i / 4 {
                0 => Vec3::new(2.0, 0.0, 0.0),
                1 => Vec3::new(0.0, 3.0, 0.0),
                _ => Vec3::new(0.0, 0.0, 4.0),
            };
            assert_eq!(d, expected, "edge {i}");
        }
    }

    #[test]
    fn line_vertices_flatten_edges() {
        let bb = BoundingBox::default();
        let verts = bb.line_vertices();
        let edges = bb.edges();
        assert_eq!(verts.len(), 24);
        assert_eq!(verts[0], edges[0][0].to_array());
        assert_eq!(verts[23], edges[11][1].to_array());
    }
}
