//! Sparse-field level-set evolution engine for the limn toolkit.
//!
//! [`SparseFieldEngine`] segments a 3D volume by propagating an implicit
//! contour toward object boundaries, maintaining a signed-distance-like
//! field only in a thin band of layers around the contour. Each iteration
//! runs three passes:
//!
//! 1. **Active layer**: solve the discretized evolution PDE on the zero
//!    layer with deferred two-phase commits, and classify which voxels
//!    leave the contour.
//! 2. **Transitions**: migrate departing voxels ring by ring, dragging
//!    qualifying neighbours into the band behind them.
//! 3. **Inactive layers**: re-derive phi for the non-zero rings from their
//!    inner support, demoting voxels that lost it.
//!
//! The engine never scans the full volume after initialization; all
//! bookkeeping is proportional to the band.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod consistency;
mod dump;
pub mod engine;
pub mod field;
mod inactive;
pub mod metrics;
pub mod snapshot;
mod solver;
mod transition;

pub use config::{ConfigError, EvolveConfig, SeedSource};
pub use consistency::ConsistencyWarning;
pub use engine::{Phase, SparseFieldEngine};
pub use field::VoxelField;
pub use metrics::EvolveMetrics;
pub use snapshot::StateSnapshot;
