//! Particle delegates shipped with the viewer.
//!
//! - [`PointSpriteDelegate`] - sphere-shaded point sprites

mod point;

pub use point::{PointInitData, PointSpriteDelegate};
