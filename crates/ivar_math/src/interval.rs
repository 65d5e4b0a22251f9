/// A closed range of `f32` values.
///
/// Used for the parametric span a ray spends inside a bounding box and for
/// the range of `t` values a primitive accepts as a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// True when the interval contains no values (min > max).
    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }

    /// Overlap of two intervals. Empty when they are disjoint.
    ///
    /// `f32::max`/`f32::min` ignore NaN, so a NaN bound coming out of a slab
    /// test (0 * inf) leaves the other side unchanged.
    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// A universe interval (contains everything).
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };
}
