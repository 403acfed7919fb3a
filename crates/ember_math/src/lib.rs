//! Ember math types: vectors, intervals, rays and bounding boxes.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;
