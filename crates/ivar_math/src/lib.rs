//! Ivar math - vector, bounds and ray types shared by the renderer.

// Re-export glam for convenience
pub use glam::*;

mod bounds;
mod interval;
mod ray;

pub use bounds::Bounds3;
pub use interval::Interval;
pub use ray::Ray;
