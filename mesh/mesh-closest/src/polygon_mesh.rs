//! Triangle mesh with cached closest-point queries.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, Weak};

use mesh_cache::LazyCache;
use mesh_types::{MeshTopology, Point3, Polygon, Triangle};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::bvh::IndexEntry;
use crate::error::{QueryError, QueryResult};
use crate::location::{INVALID_LOCATION, Location};
use crate::params::ClosestPointParams;
use crate::project::project;
use crate::spatial_cache::SpatialQueryCache;

/// Vertex positions and triangle index triples.
#[derive(Debug, Default)]
pub(crate) struct MeshData {
    vertices: Vec<Point3<f32>>,
    topology: Vec<Polygon>,
}

impl MeshData {
    fn vertex(&self, index: u32) -> Option<Point3<f32>> {
        self.vertices.get(index as usize).copied()
    }

    /// Project `query` onto one polygon.
    ///
    /// Returns the squared distance to the projected point and its location,
    /// or `None` when the polygon references a missing vertex.
    fn project_onto(&self, polygon_index: usize, query: &Point3<f32>) -> Option<(f32, Location)> {
        let polygon = *self.topology.get(polygon_index)?;
        let [a, b, c] = polygon;

        let (Some(v1), Some(v2), Some(v3)) = (self.vertex(a), self.vertex(b), self.vertex(c))
        else {
            warn!(
                "Skipping polygon {} with out-of-range vertex ({:?}, {} vertices)",
                polygon_index,
                polygon,
                self.vertices.len()
            );
            return None;
        };

        let weights = project(&v1, &v2, &v3, query);
        let point = Triangle::new(v1, v2, v3).point_at(&weights);
        let distance_sq = (point - query).norm_squared();

        Some((distance_sq, Location::new(polygon, polygon_index, weights)))
    }
}

impl MeshTopology for MeshData {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn polygon_count(&self) -> usize {
        self.topology.len()
    }

    fn vertex_at(&self, index: usize) -> Point3<f32> {
        self.vertices.get(index).copied().unwrap_or_else(Point3::origin)
    }

    fn polygon_at(&self, index: usize) -> Polygon {
        self.topology.get(index).copied().unwrap_or_default()
    }
}

/// A triangle mesh answering closest-point queries.
///
/// A `PolygonMesh` only exists behind an [`Arc`]: [`create`](Self::create)
/// and [`with_params`](Self::with_params) are the only constructors. The
/// mesh hands a weak reference to itself to its spatial index cache, which
/// reads the mesh data when it builds.
///
/// # Cache staleness
///
/// The spatial index is built on the first [`closest_point`](Self::closest_point)
/// and reused until [`LazyCache::invalidate`] is called on
/// [`spatial_cache`](Self::spatial_cache). Rebuilding the mesh does *not*
/// invalidate it; call `invalidate` after changing vertex positions.
///
/// # Example
///
/// ```
/// use mesh_closest::{MeshTopology, PolygonMesh};
/// use mesh_types::Point3;
///
/// let mesh = PolygonMesh::create();
/// mesh.build_mesh(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(1.0, 1.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [0, 2, 3]],
/// )?;
/// assert_eq!(mesh.polygon_count(), 2);
///
/// let location = mesh.closest_point(&Point3::new(0.5, 0.5, 0.5));
/// assert!(location.is_valid);
///
/// let p = mesh.evaluate_position(&location);
/// assert!((p - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-6);
/// # Ok::<(), mesh_closest::QueryError>(())
/// ```
#[derive(Debug)]
pub struct PolygonMesh {
    this: Weak<PolygonMesh>,
    data: RwLock<MeshData>,
    cache: LazyCache<SpatialQueryCache>,
    params: ClosestPointParams,
}

impl PolygonMesh {
    /// Create an empty mesh with default query parameters.
    #[must_use]
    pub fn create() -> Arc<Self> {
        Self::with_params(ClosestPointParams::default())
    }

    /// Create an empty mesh with custom query parameters.
    #[must_use]
    pub fn with_params(params: ClosestPointParams) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            data: RwLock::new(MeshData::default()),
            cache: LazyCache::new(),
            params,
        })
    }

    /// Query parameters this mesh was created with.
    #[must_use]
    pub const fn params(&self) -> &ClosestPointParams {
        &self.params
    }

    /// The lazily built spatial index.
    ///
    /// Use [`LazyCache::invalidate`] to force a rebuild after changing the
    /// mesh, and [`LazyCache::is_valid`] to check whether one is held.
    #[must_use]
    pub const fn spatial_cache(&self) -> &LazyCache<SpatialQueryCache> {
        &self.cache
    }

    /// Replace the vertices and topology.
    ///
    /// Only the counts are checked; polygons referencing missing vertices
    /// are accepted here (see [`validate_topology`](Self::validate_topology)).
    /// The spatial index is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::TooFewVertices`] for fewer than three vertices
    /// and [`QueryError::EmptyTopology`] when no polygons are given. The
    /// mesh is unchanged on error.
    pub fn build_mesh(&self, vertices: Vec<Point3<f32>>, topology: Vec<Polygon>) -> QueryResult<()> {
        if vertices.len() < 3 {
            return Err(QueryError::TooFewVertices {
                count: vertices.len(),
            });
        }
        if topology.is_empty() {
            return Err(QueryError::EmptyTopology);
        }

        debug!(
            "Building mesh: {} vertices, {} polygons",
            vertices.len(),
            topology.len()
        );

        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.vertices = vertices;
        data.topology = topology;
        Ok(())
    }

    /// Check that every polygon references existing vertices.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::VertexIndexOutOfRange`] for the first offending
    /// polygon.
    pub fn validate_topology(&self) -> QueryResult<()> {
        let data = self.read_data();
        let vertex_count = data.vertices.len();

        for (polygon, indices) in data.topology.iter().enumerate() {
            if let Some(&vertex) = indices.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(QueryError::VertexIndexOutOfRange {
                    polygon,
                    vertex,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Find the point on the mesh closest to `query`.
    ///
    /// The spatial index is asked for the `candidate_count` polygons whose
    /// bounding boxes are nearest to `query`; each is projected and the
    /// closest projection wins, the earliest candidate on exact ties.
    /// Because candidates are ranked by box distance, the result is the
    /// best of those candidates and not always the global optimum.
    ///
    /// Returns [`INVALID_LOCATION`] when the mesh has fewer than three
    /// vertices or no candidate yields a finite distance.
    #[must_use]
    pub fn closest_point(&self, query: &Point3<f32>) -> Location {
        if self.vertex_count() < 3 {
            return INVALID_LOCATION;
        }

        let Some(this) = self.this.upgrade() else {
            return INVALID_LOCATION;
        };
        let cache = self.cache.get_or_build(&this);
        let candidates = cache
            .index()
            .query_k_nearest(query, self.params.candidate_count);

        let data = self.read_data();
        let evaluate = |entry: &IndexEntry| data.project_onto(entry.polygon_index, query);
        let results: Vec<Option<(f32, Location)>> = if self.params.is_parallel(candidates.len()) {
            candidates.par_iter().map(evaluate).collect()
        } else {
            candidates.iter().map(evaluate).collect()
        };
        drop(data);

        let mut min_distance_sq = f32::MAX;
        let mut closest = INVALID_LOCATION;
        for (distance_sq, location) in results.into_iter().flatten() {
            if distance_sq < min_distance_sq {
                min_distance_sq = distance_sq;
                closest = location;
            }
        }

        closest
    }

    /// Map a location back to a point using the current vertex positions.
    ///
    /// Returns the origin for an invalid location. Missing vertices count
    /// as the origin.
    #[must_use]
    pub fn evaluate_position(&self, location: &Location) -> Point3<f32> {
        if !location.is_valid {
            return Point3::origin();
        }

        let data = self.read_data();
        let [a, b, c] = location.vertex_indices;

        Triangle::new(
            data.vertex_at(a as usize),
            data.vertex_at(b as usize),
            data.vertex_at(c as usize),
        )
        .point_at(&location.barycentric_coords)
    }

    pub(crate) fn read_data(&self) -> RwLockReadGuard<'_, MeshData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MeshTopology for PolygonMesh {
    fn vertex_count(&self) -> usize {
        self.read_data().vertex_count()
    }

    fn polygon_count(&self) -> usize {
        self.read_data().polygon_count()
    }

    fn vertex_at(&self, index: usize) -> Point3<f32> {
        self.read_data().vertex_at(index)
    }

    fn polygon_at(&self, index: usize) -> Polygon {
        self.read_data().polygon_at(index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Arc<PolygonMesh> {
        let mesh = PolygonMesh::create();
        mesh.build_mesh(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        mesh
    }

    #[test]
    fn build_mesh_rejects_too_few_vertices() {
        let mesh = PolygonMesh::create();
        let result = mesh.build_mesh(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![[0, 1, 1]],
        );
        assert_eq!(result, Err(QueryError::TooFewVertices { count: 2 }));
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn build_mesh_rejects_empty_topology() {
        let mesh = PolygonMesh::create();
        let result = mesh.build_mesh(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Vec::new(),
        );
        assert_eq!(result, Err(QueryError::EmptyTopology));
        assert!(mesh.is_empty());
    }

    #[test]
    fn accessors() {
        let mesh = unit_square();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.polygon_count(), 2);
        assert_eq!(mesh.vertex_at(2), Point3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.polygon_at(1), [0, 2, 3]);
        assert_eq!(mesh.triangle(1).unwrap().v2, Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn out_of_range_accessors_return_zero() {
        let mesh = unit_square();
        assert_eq!(mesh.vertex_at(4), Point3::origin());
        assert_eq!(mesh.polygon_at(2), [0, 0, 0]);
        assert!(mesh.triangle(2).is_none());
    }

    #[test]
    fn unbuilt_mesh_gives_invalid_location() {
        let mesh = PolygonMesh::create();
        let location = mesh.closest_point(&Point3::new(1.0, 2.0, 3.0));
        assert!(!location.is_valid);
        assert!(!mesh.spatial_cache().is_valid());
    }

    #[test]
    fn invalid_location_evaluates_to_origin() {
        let mesh = unit_square();
        assert_eq!(mesh.evaluate_position(&INVALID_LOCATION), Point3::origin());
    }

    #[test]
    fn interior_query() {
        let mesh = unit_square();
        let location = mesh.closest_point(&Point3::new(0.75, 0.25, 2.0));

        assert!(location.is_valid);
        assert_eq!(location.polygon_index, 0);
        assert_eq!(location.vertex_indices, [0, 1, 2]);
        assert_relative_eq!(location.barycentric_coords.sum(), 1.0, epsilon = 1e-6);

        let p = mesh.evaluate_position(&location);
        assert_relative_eq!(p, Point3::new(0.75, 0.25, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn first_query_builds_cache() {
        let mesh = unit_square();
        assert!(!mesh.spatial_cache().is_valid());
        let _ = mesh.closest_point(&Point3::new(0.5, 0.5, 1.0));
        assert!(mesh.spatial_cache().is_valid());
        assert_eq!(mesh.spatial_cache().build_count(), 1);
    }

    #[test]
    fn validate_topology_reports_first_bad_polygon() {
        let mesh = unit_square();
        assert!(mesh.validate_topology().is_ok());

        mesh.build_mesh(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 5, 9], [4, 1, 2]],
        )
        .unwrap();
        assert_eq!(
            mesh.validate_topology(),
            Err(QueryError::VertexIndexOutOfRange {
                polygon: 1,
                vertex: 5,
                vertex_count: 3,
            })
        );
    }

    #[test]
    fn polygon_with_missing_vertex_is_skipped() {
        let mesh = PolygonMesh::create();
        mesh.build_mesh(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 9]],
        )
        .unwrap();

        // Above the broken polygon's half of the square.
        let location = mesh.closest_point(&Point3::new(0.2, 0.8, 1.0));
        assert!(location.is_valid);
        assert_eq!(location.polygon_index, 0);

        let p = mesh.evaluate_position(&location);
        assert_relative_eq!(p, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn every_candidate_broken_gives_invalid_location() {
        let mesh = PolygonMesh::create();
        mesh.build_mesh(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 3]],
        )
        .unwrap();

        assert!(!mesh.closest_point(&Point3::new(0.1, 0.1, 0.0)).is_valid);
    }

    #[test]
    fn parallel_evaluation_matches_sequential() {
        let params = ClosestPointParams::new().with_parallel_threshold(0);
        let parallel = PolygonMesh::with_params(params);
        let sequential = unit_square();
        parallel
            .build_mesh(
                (0..4).map(|i| sequential.vertex_at(i)).collect(),
                vec![[0, 1, 2], [0, 2, 3]],
            )
            .unwrap();

        for q in [
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(3.5, 3.5, 3.5),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(-1.0, 0.3, 0.2),
        ] {
            assert_eq!(parallel.closest_point(&q), sequential.closest_point(&q));
        }
    }

    #[test]
    fn collapsed_triangle_is_not_selected() {
        let mesh = PolygonMesh::create();
        mesh.build_mesh(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 5.0),
                Point3::new(1.0, 0.0, 5.0),
                Point3::new(0.0, 1.0, 5.0),
            ],
            // First edge of polygon 0 has zero length.
            vec![[0, 0, 1], [2, 3, 4]],
        )
        .unwrap();

        let location = mesh.closest_point(&Point3::new(0.5, 0.5, 0.0));
        assert!(location.is_valid);
        assert_eq!(location.polygon_index, 1);
    }
}
