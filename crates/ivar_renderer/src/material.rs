//! Material trait for surface scattering.
//!
//! Direction conventions used throughout: `wo` is the direction of the ray
//! arriving at the surface (pointing *into* it), `wi` is the scattered
//! direction leaving the surface, and `n` is the surface's geometric normal.

use crate::sampling::uniform_hemisphere;
use crate::EPSILON;
use ivar_math::Vec3;
use rand::RngCore;
use std::f32::consts::{FRAC_1_PI, PI};
use std::sync::Arc;

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// BRDF value for light scattered from `wi` toward the viewer along `wo`.
    fn eval(&self, wo: Vec3, wi: Vec3, n: Vec3) -> Color;

    /// Importance-sample a scattered direction.
    ///
    /// May return a zero vector when no direction can be produced; the
    /// integrator treats that as an absorbed path.
    fn sample(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Density of [`Material::sample`] producing `wi`.
    fn pdf(&self, wo: Vec3, wi: Vec3, n: Vec3) -> f32;

    /// Radiance emitted by the surface.
    ///
    /// Most materials return black (no emission).
    fn emission(&self) -> Color {
        Color::ZERO
    }

    /// True if the surface is a light source.
    fn has_emission(&self) -> bool {
        self.emission() != Color::ZERO
    }
}

impl<M: Material + ?Sized> Material for Arc<M> {
    fn eval(&self, wo: Vec3, wi: Vec3, n: Vec3) -> Color {
        (**self).eval(wo, wi, n)
    }

    fn sample(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        (**self).sample(wo, n, rng)
    }

    fn pdf(&self, wo: Vec3, wi: Vec3, n: Vec3) -> f32 {
        (**self).pdf(wo, wi, n)
    }

    fn emission(&self) -> Color {
        (**self).emission()
    }

    fn has_emission(&self) -> bool {
        (**self).has_emission()
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Material for Lambertian {
    fn eval(&self, _wo: Vec3, wi: Vec3, n: Vec3) -> Color {
        if n.dot(wi) > 0.0 {
            self.albedo * FRAC_1_PI
        } else {
            Color::ZERO
        }
    }

    fn sample(&self, _wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        uniform_hemisphere(n, rng)
    }

    fn pdf(&self, _wo: Vec3, wi: Vec3, n: Vec3) -> f32 {
        if n.dot(wi) > 0.0 {
            0.5 / PI
        } else {
            0.0
        }
    }
}

/// Perfect mirror.
///
/// The reflection lobe is a delta distribution. It is handled as a discrete
/// choice: sampling always returns the mirrored direction with `pdf = 1`, and
/// `eval` is non-zero only along that direction, so explicit light samples
/// never contribute through a mirror.
#[derive(Debug, Clone)]
pub struct Mirror {
    albedo: Color,
}

impl Mirror {
    /// Angular tolerance (as a cosine) for matching the mirrored direction.
    const ALIGNMENT: f32 = 1.0 - 1e-4;

    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    fn is_mirrored(wo: Vec3, wi: Vec3, n: Vec3) -> bool {
        reflect(wo, n).normalize_or_zero().dot(wi.normalize_or_zero()) > Self::ALIGNMENT
    }
}

impl Material for Mirror {
    fn eval(&self, wo: Vec3, wi: Vec3, n: Vec3) -> Color {
        let cos = n.dot(wi);
        if cos.abs() < EPSILON || !Self::is_mirrored(wo, wi, n) {
            return Color::ZERO;
        }
        // Cancels the cosine the integrator applies
        self.albedo / cos
    }

    fn sample(&self, wo: Vec3, n: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        reflect(wo, n)
    }

    fn pdf(&self, wo: Vec3, wi: Vec3, n: Vec3) -> f32 {
        if Self::is_mirrored(wo, wi, n) {
            1.0
        } else {
            0.0
        }
    }
}

/// Diffuse light emitter.
///
/// Emits constant radiance and reflects like a Lambertian surface with the
/// given albedo (black unless set with [`DiffuseLight::with_albedo`]).
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Color,
    surface: Lambertian,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self {
            emit,
            surface: Lambertian::new(Color::ZERO),
        }
    }

    pub fn with_albedo(mut self, albedo: Color) -> Self {
        self.surface = Lambertian::new(albedo);
        self
    }
}

impl Material for DiffuseLight {
    fn eval(&self, wo: Vec3, wi: Vec3, n: Vec3) -> Color {
        self.surface.eval(wo, wi, n)
    }

    fn sample(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.surface.sample(wo, n, rng)
    }

    fn pdf(&self, wo: Vec3, wi: Vec3, n: Vec3) -> f32 {
        self.surface.pdf(wo, wi, n)
    }

    fn emission(&self) -> Color {
        self.emit
    }
}

/// Reflect a vector about a normal.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
