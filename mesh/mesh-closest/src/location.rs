//! Query results expressed as barycentric positions on a polygon.

use mesh_types::{Polygon, Vector3};
use nalgebra::ArrayStorage;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position on a mesh: a polygon plus barycentric weights on its corners.
///
/// A location stores no 3-D point. Evaluating it against the mesh uses the
/// current vertex positions, so it follows the surface when vertices move
/// while the topology stays the same.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Vertex indices of the polygon the location lies on.
    pub vertex_indices: Polygon,
    /// Index of that polygon in the mesh topology.
    pub polygon_index: usize,
    /// One weight per entry of `vertex_indices`.
    pub barycentric_coords: Vector3<f32>,
    /// Whether this location refers to a real mesh position.
    pub is_valid: bool,
}

/// The "no result" sentinel: every field zeroed and `is_valid` false.
pub const INVALID_LOCATION: Location = Location {
    vertex_indices: [0, 0, 0],
    polygon_index: 0,
    barycentric_coords: Vector3::from_array_storage(ArrayStorage([[0.0; 3]])),
    is_valid: false,
};

impl Default for Location {
    fn default() -> Self {
        INVALID_LOCATION
    }
}

impl Location {
    /// Create a valid location.
    #[must_use]
    pub const fn new(
        vertex_indices: Polygon,
        polygon_index: usize,
        barycentric_coords: Vector3<f32>,
    ) -> Self {
        Self {
            vertex_indices,
            polygon_index,
            barycentric_coords,
            is_valid: true,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_valid {
            return write!(f, "Location(invalid)");
        }
        let [a, b, c] = self.vertex_indices;
        let w = &self.barycentric_coords;
        write!(
            f,
            "Location(polygon {}, vertices [{a}, {b}, {c}], weights [{}, {}, {}])",
            self.polygon_index, w.x, w.y, w.z
        )
    }
}
