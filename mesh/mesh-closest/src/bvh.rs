//! Bounding volume hierarchy over triangle bounding boxes.
//!
//! The tree is bulk-loaded from the complete set of `(bounding box, polygon
//! index)` entries in one pass, never by incremental insertion:
//!
//! 1. Compute the bounds of all entries in the node
//! 2. Find the axis with maximum extent
//! 3. Sort entries by box centre along that axis
//! 4. Split at the median and recurse until a node fits in one leaf
//!
//! Nodes live in a flat array (index 0 is the root) and entries are reordered
//! so each leaf owns a contiguous slice.
//!
//! [`SpatialIndex::query_k_nearest`] returns the `k` entries whose *boxes* are
//! closest to a point, using a best-first traversal ordered by point-to-box
//! distance. Box distance is a lower bound on triangle distance, so this is a
//! pre-filter: the triangle nearest to the point is not guaranteed to be
//! among the `k` nearest boxes.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use mesh_types::{Aabb, Point3, Triangle};
use rayon::prelude::*;
use tracing::debug;

/// A bounding box paired with the index of the polygon it encloses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    /// Bounding box of the polygon's vertices.
    pub bounds: Aabb,
    /// Index of the polygon in the mesh topology.
    pub polygon_index: usize,
}

impl IndexEntry {
    /// Create a new entry.
    #[must_use]
    pub const fn new(bounds: Aabb, polygon_index: usize) -> Self {
        Self {
            bounds,
            polygon_index,
        }
    }

    /// Create an entry for a triangle.
    ///
    /// Only the three corners are enclosed; polygons with more vertices
    /// would need the union over all of them.
    #[must_use]
    pub fn from_triangle(triangle: &Triangle, polygon_index: usize) -> Self {
        Self::new(triangle.bounds(), polygon_index)
    }

    fn centre_on(&self, axis: usize) -> f32 {
        let c = self.bounds.center();
        match axis {
            0 => c.x,
            1 => c.y,
            _ => c.z,
        }
    }
}

/// Compute one entry per polygon.
///
/// `bounds_of(i)` must return the bounding box of polygon `i`. Each call is
/// independent, so with `parallel` set the work is spread over rayon's pool;
/// results land at their polygon's position either way.
pub fn collect_entries<F>(count: usize, parallel: bool, bounds_of: F) -> Vec<IndexEntry>
where
    F: Fn(usize) -> Aabb + Sync + Send,
{
    if parallel {
        (0..count)
            .into_par_iter()
            .map(|i| IndexEntry::new(bounds_of(i), i))
            .collect()
    } else {
        (0..count)
            .map(|i| IndexEntry::new(bounds_of(i), i))
            .collect()
    }
}

/// A node in the index tree.
#[derive(Debug, Clone)]
enum IndexNode {
    /// Internal node with two children.
    Internal {
        /// Bounding box containing all descendants.
        bounds: Aabb,
        /// Index of left child in the nodes array.
        left: usize,
        /// Index of right child in the nodes array.
        right: usize,
    },
    /// Leaf node owning a run of entries.
    Leaf {
        /// Bounding box of this leaf.
        bounds: Aabb,
        /// Start index in the entries array.
        first_entry: usize,
        /// Number of entries in this leaf.
        entry_count: usize,
    },
}

impl IndexNode {
    fn bounds(&self) -> &Aabb {
        match self {
            Self::Internal { bounds, .. } | Self::Leaf { bounds, .. } => bounds,
        }
    }
}

/// Statistics about index structure.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of internal (branch) nodes.
    pub internal_count: usize,
    /// Number of leaf nodes.
    pub leaf_count: usize,
    /// Maximum depth of the tree (the root has depth 0).
    pub max_depth: usize,
    /// Maximum number of entries in any leaf.
    pub max_leaf_size: usize,
    /// Total entries stored across all leaves.
    pub total_entries_in_leaves: usize,
}

/// Balanced bounding volume tree over polygon bounding boxes.
///
/// # Example
///
/// ```
/// use mesh_closest::bvh::{IndexEntry, SpatialIndex};
/// use mesh_types::{Point3, Triangle};
///
/// let near = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// let far = Triangle::new(
///     Point3::new(5.0, 0.0, 0.0),
///     Point3::new(6.0, 0.0, 0.0),
///     Point3::new(5.0, 1.0, 0.0),
/// );
/// let entries = vec![
///     IndexEntry::from_triangle(&near, 0),
///     IndexEntry::from_triangle(&far, 1),
/// ];
///
/// let index = SpatialIndex::build(entries);
/// let nearest = index.query_k_nearest(&Point3::new(5.5, 0.5, 1.0), 1);
/// assert_eq!(nearest[0].polygon_index, 1);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// The tree nodes (index 0 is the root).
    nodes: Vec<IndexNode>,
    /// The entries, reordered during construction.
    entries: Vec<IndexEntry>,
    /// Maximum entries per leaf node.
    max_leaf_size: usize,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            entries: Vec::new(),
            max_leaf_size: 16,
        }
    }

    /// Set the maximum number of entries per leaf node (at least 1).
    #[must_use]
    pub fn with_max_leaf_size(mut self, max: usize) -> Self {
        self.max_leaf_size = max.max(1);
        self
    }

    /// Bulk-build an index with the default leaf size.
    #[must_use]
    pub fn build(entries: Vec<IndexEntry>) -> Self {
        Self::new().build_from(entries)
    }

    /// Bulk-build the index from `entries`, discarding any previous tree.
    #[must_use]
    pub fn build_from(mut self, mut entries: Vec<IndexEntry>) -> Self {
        self.nodes.clear();
        self.entries.clear();

        if entries.is_empty() {
            return self;
        }

        // Upper bound for a binary tree
        self.nodes.reserve(entries.len() * 2);

        let len = entries.len();
        self.build_recursive(&mut entries, 0, len);
        self.entries = entries;

        debug!(
            "Built spatial index: {} entries, {} nodes, leaf size {}",
            self.entries.len(),
            self.nodes.len(),
            self.max_leaf_size
        );

        self
    }

    /// Recursively build the subtree over `entries[start..end]`.
    ///
    /// Returns the index of the created node.
    fn build_recursive(&mut self, entries: &mut [IndexEntry], start: usize, end: usize) -> usize {
        let count = end - start;
        let bounds = entries[start..end]
            .iter()
            .fold(Aabb::empty(), |acc, e| acc.union(&e.bounds));

        if count <= self.max_leaf_size {
            let node_idx = self.nodes.len();
            self.nodes.push(IndexNode::Leaf {
                bounds,
                first_entry: start,
                entry_count: count,
            });
            return node_idx;
        }

        let axis = bounds.longest_axis();
        entries[start..end].sort_by(|a, b| {
            a.centre_on(axis)
                .partial_cmp(&b.centre_on(axis))
                .unwrap_or(Ordering::Equal)
        });

        let mid = start + count / 2;

        // Reserve this slot; children are patched in once built.
        let node_idx = self.nodes.len();
        self.nodes.push(IndexNode::Internal {
            bounds,
            left: 0,
            right: 0,
        });

        let left_idx = self.build_recursive(entries, start, mid);
        let right_idx = self.build_recursive(entries, mid, end);

        if let IndexNode::Internal { left, right, .. } = &mut self.nodes[node_idx] {
            *left = left_idx;
            *right = right_idx;
        }

        node_idx
    }

    /// Return the `k` entries whose boxes are closest to `point`.
    ///
    /// The result holds `min(k, len())` entries ordered by increasing
    /// point-to-box distance. Entries at equal distance come out in
    /// ascending polygon index, whichever leaves they sit in.
    #[must_use]
    pub fn query_k_nearest(&self, point: &Point3<f32>, k: usize) -> Vec<IndexEntry> {
        let mut found = Vec::with_capacity(k.min(self.entries.len()));
        if k == 0 || self.nodes.is_empty() {
            return found;
        }

        let mut heap = BinaryHeap::new();
        heap.push(Reverse((
            BoxDistance(self.nodes[0].bounds().distance_squared_to(point)),
            Pending::Node(0),
        )));

        while let Some(Reverse((_, pending))) = heap.pop() {
            match pending {
                Pending::Entry(_, slot) => {
                    found.push(self.entries[slot]);
                    if found.len() == k {
                        break;
                    }
                }
                Pending::Node(node_idx) => match &self.nodes[node_idx] {
                    IndexNode::Internal { left, right, .. } => {
                        for child in [*left, *right] {
                            let d = self.nodes[child].bounds().distance_squared_to(point);
                            heap.push(Reverse((BoxDistance(d), Pending::Node(child))));
                        }
                    }
                    IndexNode::Leaf {
                        first_entry,
                        entry_count,
                        ..
                    } => {
                        for slot in *first_entry..(*first_entry + *entry_count) {
                            let entry = &self.entries[slot];
                            let d = entry.bounds.distance_squared_to(point);
                            heap.push(Reverse((
                                BoxDistance(d),
                                Pending::Entry(entry.polygon_index, slot),
                            )));
                        }
                    }
                },
            }
        }

        found
    }

    /// Get the number of entries in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the bounding box of all entries.
    #[must_use]
    pub fn root_bounds(&self) -> Option<&Aabb> {
        self.nodes.first().map(IndexNode::bounds)
    }

    /// Get statistics about the tree structure.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats::default();
        if !self.nodes.is_empty() {
            self.collect_stats(0, 0, &mut stats);
        }
        stats
    }

    fn collect_stats(&self, node_idx: usize, depth: usize, stats: &mut IndexStats) {
        stats.max_depth = stats.max_depth.max(depth);

        match &self.nodes[node_idx] {
            IndexNode::Leaf { entry_count, .. } => {
                stats.leaf_count += 1;
                stats.total_entries_in_leaves += entry_count;
                stats.max_leaf_size = stats.max_leaf_size.max(*entry_count);
            }
            IndexNode::Internal { left, right, .. } => {
                stats.internal_count += 1;
                self.collect_stats(*left, depth + 1, stats);
                self.collect_stats(*right, depth + 1, stats);
            }
        }
    }
}

/// Squared point-to-box distance with a total order for the traversal heap.
#[derive(Debug, Clone, Copy)]
struct BoxDistance(f32);

impl PartialEq for BoxDistance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BoxDistance {}

impl PartialOrd for BoxDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoxDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Work item in the best-first traversal.
///
/// At equal distance nodes pop before entries (variant order). Every subtree
/// tied with an entry is opened first, so tied entries are all in the heap
/// before any of them pops and come out by polygon index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Pending {
    /// A tree node by index.
    Node(usize),
    /// An entry, keyed by polygon index then slot.
    Entry(usize, usize),
}
