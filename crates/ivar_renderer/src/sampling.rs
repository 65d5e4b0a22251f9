//! Random sampling helpers.
//!
//! Every function takes the generator explicitly so each render worker can
//! own an independent, seeded stream.

use ivar_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform `f32` in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Rotate a direction from the local frame (z = up) into the frame around `n`.
///
/// `n` must be unit length.
pub fn to_world(local: Vec3, n: Vec3) -> Vec3 {
    let (b, c) = n.any_orthonormal_pair();
    local.x * b + local.y * c + local.z * n
}

/// Uniformly distributed direction on the hemisphere around `n`.
///
/// Density is `1 / (2 * pi)` per steradian.
pub fn uniform_hemisphere(n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let z = (1.0 - 2.0 * gen_f32(rng)).abs();
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    to_world(Vec3::new(r * phi.cos(), r * phi.sin(), z), n)
}

/// Uniformly distributed direction on the unit sphere.
pub fn uniform_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Barycentric weights `(w0, w1, w2)` of a point uniformly distributed over a triangle.
pub fn uniform_triangle(rng: &mut dyn RngCore) -> (f32, f32, f32) {
    let x = gen_f32(rng).sqrt();
    let y = gen_f32(rng);
    (1.0 - x, x * (1.0 - y), x * y)
}
