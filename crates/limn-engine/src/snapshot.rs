//! Opaque snapshot of the tracked-layer classification.

use indexmap::IndexMap;
use limn_core::{is_tracked, Voxel};
use limn_grid::VolumeDims;

/// The tracked layers' voxel coordinates at one point in time.
///
/// Built from the dense state map, so it stays available after the engine
/// has released its band bookkeeping. Layers appear in first-encounter
/// order of the canonical sweep and are queried by signed layer offset.
#[derive(Clone, Debug)]
pub struct StateSnapshot {
    dims: VolumeDims,
    layers: IndexMap<i32, Vec<Voxel>>,
}

impl StateSnapshot {
    pub(crate) fn from_state_map(dims: VolumeDims, tags: &[i32]) -> Self {
        let mut layers: IndexMap<i32, Vec<Voxel>> = IndexMap::new();
        for v in dims.voxels() {
            let tag = tags[dims.flat_index(v)];
            if is_tracked(tag) {
                layers.entry(tag).or_default().push(v);
            }
        }
        Self { dims, layers }
    }

    /// The volume extent the snapshot covers.
    pub fn dims(&self) -> VolumeDims {
        self.dims
    }

    /// Voxels of `layer`, empty when the layer has none.
    pub fn layer(&self, layer: i32) -> &[Voxel] {
        self.layers.get(&layer).map_or(&[], |v| v.as_slice())
    }

    /// The layer offsets present in the snapshot.
    pub fn layer_indices(&self) -> impl Iterator<Item = i32> + '_ {
        self.layers.keys().copied()
    }

    /// Total tracked voxels.
    pub fn tracked_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
