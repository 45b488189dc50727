//! Closest-point query parameters.

/// Parameters controlling the spatial index and closest-point queries.
///
/// # Example
///
/// ```
/// use mesh_closest::ClosestPointParams;
///
/// let params = ClosestPointParams::default();
/// assert_eq!(params.candidate_count, 16);
///
/// let params = ClosestPointParams::new()
///     .with_candidate_count(32)
///     .with_max_leaf_size(8);
/// assert_eq!(params.candidate_count, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosestPointParams {
    /// Number of candidate triangles fetched from the spatial index per query.
    ///
    /// Candidates are ranked by distance to their bounding box, not to the
    /// triangle itself, so the true closest triangle can fall outside the
    /// first `candidate_count`. Larger values trade query time for recall.
    pub candidate_count: usize,

    /// Maximum triangles per leaf of the spatial index.
    pub max_leaf_size: usize,

    /// Minimum number of items before per-triangle bounding boxes and
    /// per-candidate projections are computed in parallel (via rayon).
    pub parallel_threshold: usize,
}

/// Default number of candidates fetched per query.
pub const DEFAULT_CANDIDATE_COUNT: usize = 16;

impl Default for ClosestPointParams {
    fn default() -> Self {
        Self {
            candidate_count: DEFAULT_CANDIDATE_COUNT,
            max_leaf_size: 16,
            parallel_threshold: 1024,
        }
    }
}

impl ClosestPointParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consider every triangle of the mesh on each query.
    ///
    /// Always finds the globally closest triangle, at the cost of projecting
    /// onto all of them.
    #[must_use]
    pub fn exhaustive() -> Self {
        Self {
            candidate_count: usize::MAX,
            ..Self::default()
        }
    }

    /// Set the number of candidates per query (at least 1).
    #[must_use]
    pub const fn with_candidate_count(mut self, count: usize) -> Self {
        self.candidate_count = if count == 0 { 1 } else { count };
        self
    }

    /// Set the maximum triangles per index leaf (at least 1).
    #[must_use]
    pub const fn with_max_leaf_size(mut self, size: usize) -> Self {
        self.max_leaf_size = if size == 0 { 1 } else { size };
        self
    }

    /// Set the item count at which work fans out onto rayon.
    #[must_use]
    pub const fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Check whether `len` items should be processed in parallel.
    #[must_use]
    pub const fn is_parallel(&self, len: usize) -> bool {
        len >= self.parallel_threshold
    }
}
