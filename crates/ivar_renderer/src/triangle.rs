//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::primitive::{Intersection, Primitive, HIT_RANGE};
use crate::sampling::uniform_triangle;
use crate::Material;
use ivar_math::{Bounds3, Ray, Vec3};
use rand::RngCore;

/// Padding applied to triangle bounds so axis-aligned faces never produce
/// zero-thickness boxes.
const BOUNDS_PADDING: f32 = 0.0001;

/// A triangle primitive.
pub struct Triangle<M: Material> {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Edges from v0
    e1: Vec3,
    e2: Vec3,
    /// Face normal (unit length, follows counter-clockwise winding)
    normal: Vec3,
    area: f32,
    material: M,
    bounds: Bounds3,
}

impl<M: Material> Triangle<M> {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: M) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let cross = e1.cross(e2);

        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        let bounds = Bounds3::new(
            min - Vec3::splat(BOUNDS_PADDING),
            max + Vec3::splat(BOUNDS_PADDING),
        );

        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
            bounds,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl<M: Material + 'static> Primitive for Triangle<M> {
    fn bounds(&self) -> Bounds3 {
        self.bounds
    }

    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        let h = ray.direction().cross(self.e2);
        let a = self.e1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return Intersection::default();
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return Intersection::default();
        }

        let q = s.cross(self.e1);
        let v = f * ray.direction().dot(q);

        if v < 0.0 || u + v > 1.0 {
            return Intersection::default();
        }

        let t = f * self.e2.dot(q);
        if !HIT_RANGE.surrounds(t) {
            return Intersection::default();
        }

        Intersection::hit(t, ray.at(t), self.normal, &self.material)
    }

    fn has_emission(&self) -> bool {
        self.material.has_emission()
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (Intersection<'_>, f32) {
        let (w0, w1, w2) = uniform_triangle(rng);
        let point = w0 * self.v0 + w1 * self.v1 + w2 * self.v2;
        let pdf = if self.area > 0.0 { 1.0 / self.area } else { 0.0 };
        (Intersection::hit(0.0, point, self.normal, &self.material), pdf)
    }
}
