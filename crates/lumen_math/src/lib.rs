// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::{Aabb, Axis, AXIS_EPSILON};
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;
