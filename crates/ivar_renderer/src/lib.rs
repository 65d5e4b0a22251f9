//! Ivar - CPU Path Tracing
//!
//! A Monte Carlo path tracer for physically-based rendering: a bounding
//! volume hierarchy (median or surface area heuristic splits) over the
//! scene's primitives, and a recursive integrator with next-event
//! estimation and Russian roulette termination.
//!
//! ```no_run
//! use ivar_renderer::{
//!     render_parallel, Camera, Color, DiffuseLight, Lambertian, Primitive, RenderConfig,
//!     Scene, Sphere, SplitMethod, Vec3,
//! };
//!
//! let primitives: Vec<Box<dyn Primitive>> = vec![
//!     Box::new(Sphere::new(-3.0 * Vec3::Z, 1.0, Lambertian::new(Color::splat(0.5)))),
//!     Box::new(Sphere::new(
//!         Vec3::new(0.0, 3.0, -3.0),
//!         0.5,
//!         DiffuseLight::new(Color::splat(10.0)),
//!     )),
//! ];
//! let scene = Scene::build(primitives, SplitMethod::Sah);
//!
//! let mut camera = Camera::new().with_resolution(320, 240);
//! camera.initialize();
//!
//! let image = render_parallel(&camera, &scene, &RenderConfig::default()).unwrap();
//! assert_eq!(image.pixels.len(), 320 * 240);
//! ```

mod bucket;
mod bvh;
mod camera;
mod error;
mod integrator;
mod material;
mod mesh;
mod primitive;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod triangle;

pub use bucket::{
    generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use bvh::{Bvh, BvhNode, SplitMethod, SAH_BUCKETS};
pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use integrator::{cast_ray, SHADOW_TOLERANCE};
pub use material::{Color, DiffuseLight, Lambertian, Material, Mirror};
pub use mesh::TriangleMesh;
pub use primitive::{intersect_linear, Intersection, Primitive, HIT_RANGE};
pub use renderer::{color_to_rgba, linear_to_gamma, render, render_pixel, ImageBuffer, RenderConfig};
pub use sampling::gen_f32;
pub use scene::{Scene, DEFAULT_MAX_DEPTH, DEFAULT_RUSSIAN_ROULETTE};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from ivar_math
pub use ivar_math::{Bounds3, Interval, Ray, Vec3};

/// Small distance used for self-intersection offsets and degeneracy checks.
pub const EPSILON: f32 = 1e-4;
