//! Shader source code embedded at compile time.

/// Point-sprite particles: instanced camera-facing quads shaded as spheres.
pub const PARTICLE: &str = include_str!("../shaders/particle.wgsl");

/// Flat-colored line list used for the bounding box wireframe.
pub const BOX_LINES: &str = include_str!("../shaders/box_lines.wgsl");
