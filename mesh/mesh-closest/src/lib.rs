//! Closest-point queries on triangle meshes.
//!
//! Given a query point anywhere in space, [`PolygonMesh::closest_point`]
//! finds the nearest point on the mesh surface and returns it as a
//! [`Location`]: a polygon index plus barycentric weights. A location can be
//! evaluated again later with [`PolygonMesh::evaluate_position`], which uses
//! the mesh's current vertex positions, so it follows a deforming surface.
//!
//! The pieces:
//!
//! - [`project`] - Closest point on a single triangle, as barycentric weights
//! - [`bvh`] - Bulk-built bounding volume tree with k-nearest box queries
//! - [`SpatialQueryCache`] - The tree, built lazily and held in a
//!   [`mesh_cache::LazyCache`] until invalidated
//! - [`PolygonMesh`] - Vertex/topology storage and the query itself
//!
//! # Approximation
//!
//! Each query projects onto the [`ClosestPointParams::candidate_count`]
//! triangles (16 by default) whose bounding boxes are nearest to the query
//! point. Box distance only bounds triangle distance from below, so a
//! triangle outside that set can be closer. Use
//! [`ClosestPointParams::exhaustive`] when the true optimum is required.
//!
//! # Example
//!
//! ```
//! use mesh_closest::PolygonMesh;
//! use mesh_types::Point3;
//!
//! let mesh = PolygonMesh::create();
//! mesh.build_mesh(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! )?;
//!
//! // Beyond the far corner: clamped onto vertex 2.
//! let location = mesh.closest_point(&Point3::new(3.5, 3.5, 3.5));
//! let p = mesh.evaluate_position(&location);
//! assert!((p - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-6);
//!
//! // After moving vertices, invalidate the index before querying again.
//! mesh.build_mesh(
//!     vec![
//!         Point3::new(0.0, 0.0, 1.0),
//!         Point3::new(1.0, 0.0, 1.0),
//!         Point3::new(1.0, 1.0, 1.0),
//!         Point3::new(0.0, 1.0, 1.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! )?;
//! mesh.spatial_cache().invalidate();
//!
//! // The old location now evaluates on the moved surface.
//! let p = mesh.evaluate_position(&location);
//! assert!((p.z - 1.0).abs() < 1e-6);
//! # Ok::<(), mesh_closest::QueryError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

pub mod bvh;
mod error;
mod location;
mod params;
mod polygon_mesh;
pub mod project;
mod spatial_cache;

pub use bvh::{IndexEntry, IndexStats, SpatialIndex};
pub use error::{QueryError, QueryResult};
pub use location::{INVALID_LOCATION, Location};
pub use params::{ClosestPointParams, DEFAULT_CANDIDATE_COUNT};
pub use polygon_mesh::PolygonMesh;
pub use spatial_cache::SpatialQueryCache;

// Needed to call the vertex/polygon accessors on `PolygonMesh`
pub use mesh_types::MeshTopology;
