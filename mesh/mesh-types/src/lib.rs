//! Geometric primitives for closest-point queries.
//!
//! This crate provides the small set of types the query engine consumes:
//!
//! - [`Aabb`] - Axis-aligned bounding box with point distance
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Polygon`] - A triangle as three vertex indices
//! - [`MeshTopology`] - Vertex/polygon accessors for indexed surfaces
//!
//! # Precision
//!
//! All coordinates are single precision (`f32`).
//!
//! # Example
//!
//! ```
//! use mesh_types::{Aabb, Point3, Triangle};
//!
//! let tri = Triangle::new(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! );
//!
//! let bounds: Aabb = tri.bounds();
//! assert_eq!(bounds.distance_squared_to(&Point3::new(0.5, 0.5, 2.0)), 4.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod traits;
mod triangle;

pub use bounds::Aabb;
pub use traits::MeshTopology;
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

/// A triangular polygon as three indices into a vertex array.
pub type Polygon = [u32; 3];
