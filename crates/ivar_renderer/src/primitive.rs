//! Primitive trait and Intersection record for ray-surface queries.

use crate::{Color, Material};
use ivar_math::{Bounds3, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Parametric range a primitive accepts as a hit: strictly in front of the origin.
pub const HIT_RANGE: Interval = Interval::new(0.0, f32::INFINITY);

/// Result of a ray-surface query.
///
/// Created fresh for every query and consumed by the caller within the same
/// ray evaluation. The default value is "no hit" at infinite distance.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// Whether the ray hit anything
    pub happened: bool,
    /// Ray parameter of the hit
    pub distance: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Geometric normal at the hit (outward facing, not flipped toward the ray)
    pub normal: Vec3,
    /// Material of the surface that was hit
    pub material: Option<&'a dyn Material>,
    /// Radiance emitted by the surface at the hit
    pub emission: Color,
}

impl<'a> Default for Intersection<'a> {
    fn default() -> Self {
        Self {
            happened: false,
            distance: f32::INFINITY,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: None,
            emission: Color::ZERO,
        }
    }
}

impl<'a> Intersection<'a> {
    /// A hit on a surface with the given material.
    pub fn hit(distance: f32, point: Vec3, normal: Vec3, material: &'a dyn Material) -> Self {
        Self {
            happened: true,
            distance,
            point,
            normal,
            material: Some(material),
            emission: material.emission(),
        }
    }

    /// The nearer of two results. Ties keep `self`.
    #[inline]
    pub fn nearest(self, other: Intersection<'a>) -> Intersection<'a> {
        if self.distance <= other.distance {
            self
        } else {
            other
        }
    }
}

/// A renderable surface: the capability set the BVH and the integrator rely on.
pub trait Primitive: Send + Sync {
    /// Axis-aligned bounds of the surface.
    fn bounds(&self) -> Bounds3;

    /// Nearest intersection with the ray inside [`HIT_RANGE`], or "no hit".
    fn intersect(&self, ray: &Ray) -> Intersection<'_>;

    /// True if the surface is a light source.
    fn has_emission(&self) -> bool;

    /// Total surface area.
    fn area(&self) -> f32;

    /// Uniformly sample a point on the surface.
    ///
    /// Returns the sampled point (with its normal and emission) and the
    /// density of the choice with respect to surface area.
    fn sample(&self, rng: &mut dyn RngCore) -> (Intersection<'_>, f32);
}

impl<P: Primitive + ?Sized> Primitive for Box<P> {
    fn bounds(&self) -> Bounds3 {
        (**self).bounds()
    }

    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        (**self).intersect(ray)
    }

    fn has_emission(&self) -> bool {
        (**self).has_emission()
    }

    fn area(&self) -> f32 {
        (**self).area()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (Intersection<'_>, f32) {
        (**self).sample(rng)
    }
}

impl<P: Primitive + ?Sized> Primitive for Arc<P> {
    fn bounds(&self) -> Bounds3 {
        (**self).bounds()
    }

    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        (**self).intersect(ray)
    }

    fn has_emission(&self) -> bool {
        (**self).has_emission()
    }

    fn area(&self) -> f32 {
        (**self).area()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (Intersection<'_>, f32) {
        (**self).sample(rng)
    }
}

/// Nearest hit by testing every primitive in turn.
///
/// Linear in the number of primitives; the BVH must agree with it.
pub fn intersect_linear<'a, P: Primitive>(primitives: &'a [P], ray: &Ray) -> Intersection<'a> {
    primitives
        .iter()
        .fold(Intersection::default(), |closest, primitive| {
            closest.nearest(primitive.intersect(ray))
        })
}
