//! Traits for mesh types.

use crate::{Polygon, Triangle};
use nalgebra::Point3;

/// Read access to the vertices and polygons of an indexed surface.
///
/// Accessors return values rather than references so that implementors
/// may keep their storage behind a lock. Out-of-range lookups return a
/// zero-valued sentinel; callers that need to tell a sentinel apart from
/// real data should check the index against the count first.
pub trait MeshTopology {
    /// Get the number of vertices.
    fn vertex_count(&self) -> usize;

    /// Get the number of polygons.
    fn polygon_count(&self) -> usize;

    /// Check if the mesh is empty.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.polygon_count() == 0
    }

    /// Get a vertex position by index, or the origin when out of range.
    fn vertex_at(&self, index: usize) -> Point3<f32>;

    /// Get the vertex indices of a polygon, or `[0, 0, 0]` when out of range.
    fn polygon_at(&self, index: usize) -> Polygon;

    /// Get a polygon with resolved vertex positions.
    ///
    /// Returns `None` if the polygon index or any of its vertex indices is
    /// out of range.
    fn triangle(&self, index: usize) -> Option<Triangle> {
        if index >= self.polygon_count() {
            return None;
        }
        let count = self.vertex_count();
        let [a, b, c] = self.polygon_at(index);
        if [a, b, c].iter().any(|&v| v as usize >= count) {
            return None;
        }
        Some(Triangle::new(
            self.vertex_at(a as usize),
            self.vertex_at(b as usize),
            self.vertex_at(c as usize),
        ))
    }
}
