//! Triangle with resolved vertex positions.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Aabb;

/// A triangle with concrete vertex positions.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Triangle, Vector3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(3.0, 0.0, 0.0),
///     Point3::new(0.0, 3.0, 0.0),
/// );
///
/// let centre = tri.point_at(&(Vector3::repeat(1.0) / 3.0));
/// assert!((centre - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f32>,
    /// Second vertex.
    pub v1: Point3<f32>,
    /// Third vertex.
    pub v2: Point3<f32>,
}

impl Triangle {
    /// Create a triangle from its corners.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Box enclosing the three corners.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::from_point(self.v0);
        aabb.expand_to_include(&self.v1);
        aabb.expand_to_include(&self.v2);
        aabb
    }

    /// Point with barycentric weights `(x, y, z)` on `(v0, v1, v2)`.
    #[must_use]
    pub fn point_at(&self, weights: &Vector3<f32>) -> Point3<f32> {
        Point3::from(
            self.v0.coords * weights.x + self.v1.coords * weights.y + self.v2.coords * weights.z,
        )
    }
}
