use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box used by the BVH.
///
/// Invariant: `min[i] <= max[i]` on every axis for a non-empty box. The empty
/// box is the inverted sentinel [`Bounds3::EMPTY`], which is the identity for
/// [`Bounds3::union`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds3 {
    /// Empty bounds (contains nothing).
    pub const EMPTY: Bounds3 = Bounds3 {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create bounds from two corner points, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Degenerate bounds holding a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest bounds enclosing both `self` and `other`.
    pub fn union(&self, other: &Bounds3) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Smallest bounds enclosing `self` and the point `p`.
    pub fn union_point(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// True for the inverted sentinel (or any box inverted on some axis).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extent along each axis.
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        0.5 * self.min + 0.5 * self.max
    }

    /// Total surface area, `2 * (dx*dy + dy*dz + dz*dx)`.
    ///
    /// Empty bounds have zero area.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the largest extent.
    pub fn max_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Get the extent along a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis(&self, n: usize) -> Interval {
        match n {
            0 => Interval::new(self.min.x, self.max.x),
            1 => Interval::new(self.min.y, self.max.y),
            _ => Interval::new(self.min.z, self.max.z),
        }
    }

    /// True if `other` lies entirely inside `self`. Empty bounds are inside anything.
    pub fn contains(&self, other: &Bounds3) -> bool {
        if other.is_empty() {
            return true;
        }
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Slab test against a ray.
    ///
    /// `inv_dir` is the per-component reciprocal of the ray direction and
    /// `dir_is_neg[i]` is true when that component is negative. The box is hit
    /// when the entry distance does not exceed the exit distance and the exit
    /// lies in front of the origin.
    pub fn intersect_p(&self, ray: &Ray, inv_dir: Vec3, dir_is_neg: [bool; 3]) -> bool {
        let mut span = Interval::UNIVERSE;

        for (axis, &negative) in dir_is_neg.iter().enumerate() {
            let slab = self.axis(axis);
            let mut t0 = (slab.min - ray.origin[axis]) * inv_dir[axis];
            let mut t1 = (slab.max - ray.origin[axis]) * inv_dir[axis];
            if negative {
                std::mem::swap(&mut t0, &mut t1);
            }
            span = span.intersect(&Interval::new(t0, t1));
        }

        !span.is_empty() && span.max >= 0.0
    }
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::EMPTY
    }
}
