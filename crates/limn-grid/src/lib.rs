//! Volume geometry and sparse grid storage for the limn toolkit.
//!
//! This crate defines [`VolumeDims`] — the bounds-checked volume extent with
//! the canonical flat ordering and the 6-connected neighbourhood — along
//! with [`DeferredGrid`], a tile-based lazily-allocated per-voxel store used
//! for the sparse scalar fields that only exist inside the narrow band.
//!
//! It also hosts the two collaborator-facing data contracts: the
//! [`ImageVolume`] trait through which the engine reads the source image,
//! and [`SeedMap`], the tri-state classification produced by an upstream
//! seeding stage.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod deferred;
pub mod dims;
pub mod error;
pub mod seed;
pub mod volume;

pub use deferred::DeferredGrid;
pub use dims::VolumeDims;
pub use error::GridError;
pub use seed::{SeedLabel, SeedMap};
pub use volume::ImageVolume;
