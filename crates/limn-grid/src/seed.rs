//! The initial tri-state classification consumed at engine start.

use crate::dims::VolumeDims;
use limn_core::Voxel;

/// Which side of the initial contour a voxel starts on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeedLabel {
    /// Interior of the initial contour.
    Inside,
    /// On the initial contour itself; becomes the zero layer.
    Zero,
    /// Exterior of the initial contour.
    #[default]
    Outside,
}

/// Dense per-voxel [`SeedLabel`] classification plus an optional reference
/// intensity, produced by an upstream seeding stage.
///
/// When `seed_intensity` is unset the engine derives it from the mean image
/// intensity over the ZERO voxels (or the INSIDE voxels, per configuration).
#[derive(Clone, Debug)]
pub struct SeedMap {
    dims: VolumeDims,
    labels: Vec<SeedLabel>,
    seed_intensity: Option<f64>,
}

impl SeedMap {
    /// An all-[`Outside`](SeedLabel::Outside) classification over `dims`.
    pub fn new(dims: VolumeDims) -> Self {
        Self {
            dims,
            labels: vec![SeedLabel::Outside; dims.cell_count()],
            seed_intensity: None,
        }
    }

    /// Rebuild a classification from an exported state map.
    ///
    /// Tags below zero (including the inside-far sentinel) map to
    /// [`SeedLabel::Inside`], zero to [`SeedLabel::Zero`], and everything
    /// positive to [`SeedLabel::Outside`]. Feeding an engine's state map
    /// back through this constructor reproduces its zero layer exactly:
    /// layer construction is a pure function of the classification.
    ///
    /// # Panics
    ///
    /// Panics if `tags.len()` does not match `dims.cell_count()`.
    pub fn from_state_tags(dims: VolumeDims, tags: &[i32]) -> Self {
        assert_eq!(tags.len(), dims.cell_count(), "state map length mismatch");
        let labels = tags
            .iter()
            .map(|&tag| {
                if tag == 0 {
                    SeedLabel::Zero
                } else if tag < 0 {
                    SeedLabel::Inside
                } else {
                    SeedLabel::Outside
                }
            })
            .collect();
        Self {
            dims,
            labels,
            seed_intensity: None,
        }
    }

    /// The volume extent this classification covers.
    pub fn dims(&self) -> VolumeDims {
        self.dims
    }

    /// The label at `v`.
    pub fn label(&self, v: Voxel) -> SeedLabel {
        self.labels[self.dims.flat_index(v)]
    }

    /// Set the label at `v`.
    pub fn set_label(&mut self, v: Voxel, label: SeedLabel) {
        let i = self.dims.flat_index(v);
        self.labels[i] = label;
    }

    /// The explicit reference intensity, if one was provided.
    pub fn seed_intensity(&self) -> Option<f64> {
        self.seed_intensity
    }

    /// Provide an explicit reference intensity, bypassing derivation.
    pub fn set_seed_intensity(&mut self, intensity: f64) {
        self.seed_intensity = Some(intensity);
    }
}
