use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// The reciprocal of the direction is computed once at construction so every
/// bounding-box slab test along the ray is multiply-only.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Direction vector. Callers that compare hit distances across rays keep it normalized.
    pub direction: Vec3,
    /// Per-component reciprocal of `direction` (may contain infinities).
    pub direction_inv: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            direction_inv: direction.recip(),
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Sign of each direction component, taken from the reciprocal so that
    /// `-0.0` counts as negative (its reciprocal is `-inf`).
    #[inline]
    pub fn dir_is_neg(&self) -> [bool; 3] {
        [
            self.direction_inv.x < 0.0,
            self.direction_inv.y < 0.0,
            self.direction_inv.z < 0.0,
        ]
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
