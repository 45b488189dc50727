//! Error types for closest-point queries.

use thiserror::Error;

/// Result type for closest-point operations.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Errors reported when building or validating a query mesh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Fewer than three vertices were supplied.
    #[error("mesh needs at least 3 vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },

    /// No polygons were supplied.
    #[error("mesh topology is empty")]
    EmptyTopology,

    /// A polygon references a vertex that does not exist.
    #[error("polygon {polygon} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        /// Index of the offending polygon.
        polygon: usize,
        /// The out-of-range vertex index.
        vertex: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::TooFewVertices { count: 2 };
        assert_eq!(format!("{err}"), "mesh needs at least 3 vertices, got 2");

        let err = QueryError::EmptyTopology;
        assert_eq!(format!("{err}"), "mesh topology is empty");

        let err = QueryError::VertexIndexOutOfRange {
            polygon: 4,
            vertex: 17,
            vertex_count: 9,
        };
        let display = format!("{err}");
        assert!(display.contains("polygon 4"));
        assert!(display.contains("vertex 17"));
        assert!(display.contains("9 vertices"));
    }
}
