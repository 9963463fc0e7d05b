//! Limn: sparse-field level-set segmentation of 3D volumes.
//!
//! This is the top-level facade crate re-exporting the public API from the
//! limn sub-crates. For most users, adding `limn` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```
//! use limn::prelude::*;
//!
//! // A flat 9×9×9 test volume; real callers implement `ImageVolume`
//! // over their decoded image data.
//! struct Flat(VolumeDims);
//! impl ImageVolume for Flat {
//!     fn dims(&self) -> VolumeDims { self.0 }
//!     fn intensity(&self, _v: Voxel) -> f64 { 100.0 }
//!     fn z_scale(&self) -> f64 { 1.0 }
//!     fn gradient_magnitudes(&self) -> Vec<f64> { vec![0.0; self.0.cell_count()] }
//! }
//!
//! let dims = VolumeDims::new(9, 9, 9).unwrap();
//! let mut seed = SeedMap::new(dims);
//! seed.set_label(Voxel::new(4, 4, 4), SeedLabel::Zero);
//!
//! let mut engine =
//!     SparseFieldEngine::new(Box::new(Flat(dims)), seed, EvolveConfig::default()).unwrap();
//! while engine.step(10) {}
//!
//! let mask = engine.state_map();
//! assert_eq!(mask.len(), dims.cell_count());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub use limn_band as band;
pub use limn_core as types;
pub use limn_engine as engine;
pub use limn_grid as grid;

/// The commonly needed names in one import.
pub mod prelude {
    pub use limn_core::{
        EvolveError, LayerCoords, ProgressEvent, ProgressSink, Voxel, INSIDE_FAR, OUTSIDE_FAR,
    };
    pub use limn_engine::{
        ConfigError, ConsistencyWarning, EvolveConfig, EvolveMetrics, Phase, SeedSource,
        SparseFieldEngine, StateSnapshot,
    };
    pub use limn_grid::{GridError, ImageVolume, SeedLabel, SeedMap, VolumeDims};
}
