//! The grid-aligned state of the narrow band.
//!
//! [`VoxelField`] bundles the per-voxel stores that the three iteration
//! passes share: the dense layer-membership tags, the sparse phi field, the
//! transient action tags, the coordinate→element lookup table, the element
//! arena, and the layer lists. Bundling them in one struct lets the passes
//! take disjoint borrows of the cooperating stores.

use limn_band::{BandArena, ElementIdx, LayerSet, UNQUEUED};
use limn_core::{INSIDE_FAR, OUTSIDE_FAR, Voxel};
use limn_grid::{DeferredGrid, ImageVolume, SeedLabel, SeedMap, VolumeDims};

/// Lookup-table slot value for "no element".
const NO_ELEMENT: u32 = u32::MAX;

/// Pending per-voxel decision for the current iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Action {
    /// Nothing scheduled.
    #[default]
    None,
    /// Queued by the transition engine for a layer change this iteration.
    ChangeLayer,
    /// Zero-layer voxel scheduled to move inward.
    MoveIn,
    /// Zero-layer voxel scheduled to move outward.
    MoveOut,
}

/// Counts and intensity sums gathered while building the active layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeedStats {
    /// Voxels classified ZERO.
    pub zero: usize,
    /// Voxels classified INSIDE.
    pub inside: usize,
    /// Voxels classified OUTSIDE.
    pub outside: usize,
    /// Sum of image intensity over the ZERO voxels.
    pub zero_intensity: f64,
    /// Sum of image intensity over the INSIDE voxels.
    pub inside_intensity: f64,
}

/// Per-voxel state of the tracked band.
///
/// Invariants (between iterations):
/// - a tracked voxel's state tag equals the index of the layer list holding
///   its element;
/// - a coordinate has a lookup-table entry iff it is tracked;
/// - the band never exceeds the half-width on either side — anything
///   further out carries a far sentinel and no element.
pub struct VoxelField {
    pub(crate) dims: VolumeDims,
    pub(crate) state: Vec<i32>,
    pub(crate) phi: DeferredGrid<f64>,
    pub(crate) action: DeferredGrid<Action>,
    lut: DeferredGrid<u32>,
    pub(crate) arena: BandArena,
    pub(crate) layers: LayerSet,
}

impl VoxelField {
    /// An untracked field over `dims`: every voxel far outside, no elements.
    pub fn new(dims: VolumeDims, half_width: u32) -> Self {
        Self {
            dims,
            state: vec![OUTSIDE_FAR; dims.cell_count()],
            phi: DeferredGrid::new(dims, 0.0),
            action: DeferredGrid::new(dims, Action::None),
            lut: DeferredGrid::new(dims, NO_ELEMENT),
            arena: BandArena::new(),
            layers: LayerSet::new(half_width),
        }
    }

    /// The volume extent.
    pub fn dims(&self) -> VolumeDims {
        self.dims
    }

    /// The layer lists.
    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    /// The element arena.
    pub fn arena(&self) -> &BandArena {
        &self.arena
    }

    /// The dense state-tag map in canonical order: a layer index for
    /// tracked voxels, a far sentinel otherwise.
    pub fn state_map(&self) -> &[i32] {
        &self.state
    }

    /// State tag at `v`.
    pub fn state(&self, v: Voxel) -> i32 {
        self.state[self.dims.flat_index(v)]
    }

    pub(crate) fn set_state(&mut self, v: Voxel, tag: i32) {
        let i = self.dims.flat_index(v);
        self.state[i] = tag;
    }

    /// Phi at `v` (meaningful only for tracked voxels).
    pub fn phi(&self, v: Voxel) -> f64 {
        self.phi.get(v)
    }

    /// Phi at `v`, or `None` when the coordinate lies outside the volume.
    pub(crate) fn phi_at(&self, v: Voxel) -> Option<f64> {
        self.dims.contains(v).then(|| self.phi.get(v))
    }

    pub(crate) fn set_action(&mut self, v: Voxel, action: Action) {
        self.action.set(v, action);
    }

    /// The element currently registered for `v`, if tracked.
    pub fn element_at(&self, v: Voxel) -> Option<ElementIdx> {
        match self.lut.get(v) {
            NO_ELEMENT => None,
            idx => Some(ElementIdx(idx)),
        }
    }

    pub(crate) fn set_element(&mut self, v: Voxel, idx: Option<ElementIdx>) {
        self.lut.set(v, idx.map_or(NO_ELEMENT, |i| i.0));
    }

    // ── Initialization ──────────────────────────────────────────────

    /// Build the zero layer from the seed classification and collapse
    /// everything else to the far sentinels. Returns the population stats
    /// the controller uses for validation and seed-intensity derivation.
    pub(crate) fn build_active_layer(
        &mut self,
        seed: &SeedMap,
        image: &dyn ImageVolume,
    ) -> SeedStats {
        let mut stats = SeedStats::default();
        for v in self.dims.voxels() {
            match seed.label(v) {
                SeedLabel::Zero => {
                    self.set_state(v, 0);
                    self.phi.set(v, 0.0);
                    let idx = self.arena.acquire(v, 0.0);
                    self.layers.push(0, idx);
                    self.set_element(v, Some(idx));
                    stats.zero += 1;
                    stats.zero_intensity += image.intensity(v);
                }
                SeedLabel::Inside => {
                    self.set_state(v, INSIDE_FAR);
                    stats.inside += 1;
                    stats.inside_intensity += image.intensity(v);
                }
                SeedLabel::Outside => {
                    self.set_state(v, OUTSIDE_FAR);
                    stats.outside += 1;
                }
            }
        }
        stats
    }

    /// Grow the inactive rings outward from the zero layer, ring by ring.
    ///
    /// Each pass adopts far-tagged neighbours of ring `i` into ring `i ± 1`
    /// and initializes their phi with the unity distance transform (the
    /// new layer index itself).
    pub(crate) fn build_inactive_rings(&mut self) {
        let k = self.layers.half_width();
        for ring in 0..k {
            self.grow_ring_from(-ring);
            if ring > 0 {
                self.grow_ring_from(ring);
            }
        }
    }

    fn grow_ring_from(&mut self, layer: i32) {
        let mut pos = 0;
        while pos < self.layers.len(layer) {
            let v = self.arena.get(self.layers.list(layer)[pos]).voxel;
            for nb in self.dims.neighbours(v) {
                self.adopt_if_far(nb, layer);
            }
            pos += 1;
        }
    }

    fn adopt_if_far(&mut self, v: Voxel, from_layer: i32) {
        let next = match self.state(v) {
            INSIDE_FAR => from_layer - 1,
            OUTSIDE_FAR => from_layer + 1,
            _ => return,
        };
        let idx = self.arena.acquire(v, UNQUEUED);
        self.layers.push(next, idx);
        self.set_element(v, Some(idx));
        self.set_state(v, next);
        self.phi.set(v, f64::from(next));
    }

    // ── Teardown ────────────────────────────────────────────────────

    /// Release all per-voxel working state. The dense state tags survive;
    /// phi, action tags, the lookup table, the arena, and the layer lists
    /// are dropped.
    pub(crate) fn release_working_state(&mut self) {
        self.phi.clear();
        self.action.clear();
        self.lut.clear();
        self.arena.clear();
        self.layers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatImage {
        dims: VolumeDims,
    }

    impl ImageVolume for FlatImage {
        fn dims(&self) -> VolumeDims {
            self.dims
        }

        fn intensity(&self, _v: Voxel) -> f64 {
            100.0
        }

        fn z_scale(&self) -> f64 {
            1.0
        }

        fn gradient_magnitudes(&self) -> Vec<f64> {
            vec![0.0; self.dims.cell_count()]
        }
    }

    fn center_seed_3x3x3() -> (FlatImage, SeedMap) {
        let dims = VolumeDims::new(3, 3, 3).unwrap();
        let mut seed = SeedMap::new(dims);
        seed.set_label(Voxel::new(1, 1, 1), SeedLabel::Zero);
        (FlatImage { dims }, seed)
    }

    #[test]
    fn active_layer_of_center_seed() {
        let (image, seed) = center_seed_3x3x3();
        let mut field = VoxelField::new(image.dims, 2);
        let stats = field.build_active_layer(&seed, &image);

        assert_eq!(stats.zero, 1);
        assert_eq!(stats.inside, 0);
        assert_eq!(stats.outside, 26);
        assert_eq!(field.layers.len(0), 1);

        let far: usize = image
            .dims
            .voxels()
            .filter(|&v| field.state(v) == OUTSIDE_FAR)
            .count();
        let inside_far: usize = image
            .dims
            .voxels()
            .filter(|&v| field.state(v) == INSIDE_FAR)
            .count();
        assert_eq!(far, 26);
        assert_eq!(inside_far, 0);
    }

    #[test]
    fn inactive_rings_of_center_seed() {
        let (image, seed) = center_seed_3x3x3();
        let mut field = VoxelField::new(image.dims, 2);
        field.build_active_layer(&seed, &image);
        field.build_inactive_rings();

        // Face neighbours become ring +1, edge voxels ring +2; the 8
        // corners (city-block distance 3) stay far.
        assert_eq!(field.layers.len(0), 1);
        assert_eq!(field.layers.len(1), 6);
        assert_eq!(field.layers.len(2), 12);
        assert_eq!(field.layers.len(-1), 0);
        assert_eq!(field.layers.len(-2), 0);
        let far: usize = image
            .dims
            .voxels()
            .filter(|&v| field.state(v) == OUTSIDE_FAR)
            .count();
        assert_eq!(far, 8);
    }

    #[test]
    fn ring_phi_is_unity_distance() {
        let (image, seed) = center_seed_3x3x3();
        let mut field = VoxelField::new(image.dims, 2);
        field.build_active_layer(&seed, &image);
        field.build_inactive_rings();

        assert_eq!(field.phi(Voxel::new(1, 1, 1)), 0.0);
        assert_eq!(field.phi(Voxel::new(0, 1, 1)), 1.0);
        assert_eq!(field.phi(Voxel::new(0, 0, 1)), 2.0);
    }

    #[test]
    fn lookup_table_tracks_band_membership() {
        let (image, seed) = center_seed_3x3x3();
        let mut field = VoxelField::new(image.dims, 2);
        field.build_active_layer(&seed, &image);
        field.build_inactive_rings();

        for v in image.dims.voxels() {
            let tracked = limn_core::is_tracked(field.state(v));
            assert_eq!(field.element_at(v).is_some(), tracked, "at {v}");
        }
    }

    #[test]
    fn release_keeps_state_tags_only() {
        let (image, seed) = center_seed_3x3x3();
        let mut field = VoxelField::new(image.dims, 2);
        field.build_active_layer(&seed, &image);
        field.build_inactive_rings();
        field.release_working_state();

        assert_eq!(field.state(Voxel::new(1, 1, 1)), 0);
        assert!(field.layers().is_empty());
        assert_eq!(field.arena().live_count(), 0);
        assert_eq!(field.element_at(Voxel::new(1, 1, 1)), None);
        assert_eq!(field.phi(Voxel::new(0, 1, 1)), 0.0);
    }
}
