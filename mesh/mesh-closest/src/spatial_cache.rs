//! The cached spatial index of a [`PolygonMesh`].

use std::sync::Weak;

use mesh_cache::CacheArtifact;
use mesh_types::{MeshTopology, Triangle};
use tracing::warn;

use crate::bvh::{SpatialIndex, collect_entries};
use crate::polygon_mesh::PolygonMesh;

/// Spatial index over the triangles of one mesh snapshot.
///
/// Holds only a weak handle to its mesh and reads vertex and topology data
/// live during [`compute`](CacheArtifact::compute); nothing is copied from
/// the mesh except bounding boxes.
#[derive(Debug)]
pub struct SpatialQueryCache {
    mesh: Weak<PolygonMesh>,
    index: SpatialIndex,
}

impl SpatialQueryCache {
    /// The index built by the last `compute`.
    #[must_use]
    pub const fn index(&self) -> &SpatialIndex {
        &self.index
    }
}

impl CacheArtifact for SpatialQueryCache {
    type Source = PolygonMesh;

    fn bind(mesh: Weak<PolygonMesh>) -> Self {
        Self {
            mesh,
            index: SpatialIndex::new(),
        }
    }

    fn compute(&mut self) {
        self.index = SpatialIndex::new();

        let Some(mesh) = self.mesh.upgrade() else {
            warn!("Mesh dropped before its spatial index was computed; index left empty");
            return;
        };

        let params = mesh.params();
        let guard = mesh.read_data();
        let data = &*guard;

        let count = data.polygon_count();
        // Missing vertices fall back to the origin, as `vertex_at` does.
        let entries = collect_entries(count, params.is_parallel(count), |i| {
            let [a, b, c] = data.polygon_at(i);
            Triangle::new(
                data.vertex_at(a as usize),
                data.vertex_at(b as usize),
                data.vertex_at(c as usize),
            )
            .bounds()
        });
        drop(guard);

        self.index = SpatialIndex::new()
            .with_max_leaf_size(params.max_leaf_size)
            .build_from(entries);
    }
}
