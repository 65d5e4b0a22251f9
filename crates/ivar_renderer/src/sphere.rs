//! Sphere primitive for ray tracing.

use crate::primitive::{Intersection, Primitive, HIT_RANGE};
use crate::sampling::uniform_sphere;
use crate::Material;
use ivar_math::{Bounds3, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere primitive.
pub struct Sphere<M: Material> {
    center: Vec3,
    radius: f32,
    material: M,
    bounds: Bounds3,
}

impl<M: Material> Sphere<M> {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: M) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bounds = Bounds3::new(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bounds,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl<M: Material + 'static> Primitive for Sphere<M> {
    fn bounds(&self) -> Bounds3 {
        self.bounds
    }

    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return Intersection::default();
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !HIT_RANGE.surrounds(root) {
            root = (h + sqrtd) / a;
            if !HIT_RANGE.surrounds(root) {
                return Intersection::default();
            }
        }

        let point = ray.at(root);
        let normal = (point - self.center) / self.radius;
        Intersection::hit(root, point, normal, &self.material)
    }

    fn has_emission(&self) -> bool {
        self.material.has_emission()
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (Intersection<'_>, f32) {
        let dir = uniform_sphere(rng);
        let point = self.center + self.radius * dir;
        let pdf = 1.0 / self.area();
        (Intersection::hit(0.0, point, dir, &self.material), pdf)
    }
}
