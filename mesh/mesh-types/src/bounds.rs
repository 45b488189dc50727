//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// The bounding volume of one triangle (or of a group of them) in a
/// spatial index. Its point distance is a lower bound on the distance to
/// anything inside it.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, Point3};
///
/// let mut aabb = Aabb::from_point(Point3::new(0.0, 0.0, 0.0));
/// aabb.expand_to_include(&Point3::new(2.0, 1.0, 1.0));
///
/// assert_eq!(aabb.longest_axis(), 0);
/// assert_eq!(aabb.distance_squared_to(&Point3::new(1.0, 0.5, 0.5)), 0.0);
/// assert_eq!(aabb.distance_squared_to(&Point3::new(1.0, 0.5, 4.0)), 9.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Aabb {
    /// Create a box from two opposite corners, in any order.
    #[must_use]
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Create a zero-volume box around a single point.
    #[inline]
    #[must_use]
    pub const fn from_point(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Create an empty box.
    ///
    /// The corners are inverted infinities, so the first point or box merged
    /// in replaces them.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::from(Vector3::repeat(f32::INFINITY)),
            max: Point3::from(Vector3::repeat(f32::NEG_INFINITY)),
        }
    }

    /// Check whether the box encloses nothing (min > max on some axis).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    /// Edge lengths along x, y and z.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Centre point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f32> {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z), the first on ties.
    #[must_use]
    pub fn longest_axis(&self) -> usize {
        self.size().imax()
    }

    /// Squared distance from `point` to the nearest point of the box.
    ///
    /// Zero inside or on the boundary; `f32::INFINITY` for an empty box.
    #[must_use]
    pub fn distance_squared_to(&self, point: &Point3<f32>) -> f32 {
        if self.is_empty() {
            return f32::INFINITY;
        }
        let nearest = point.sup(&self.min).inf(&self.max);
        (point - nearest).norm_squared()
    }

    /// Smallest box enclosing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Grow the box to include `point`.
    pub fn expand_to_include(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }
}
