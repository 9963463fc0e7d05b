//! Core types for the limn sparse-field level-set toolkit.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the voxel coordinate type, the layer/state tag vocabulary shared by
//! the band bookkeeping, and the terminal evolution error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod progress;
pub mod state;
pub mod voxel;

pub use error::EvolveError;
pub use progress::{LayerCoords, ProgressEvent, ProgressSink};
pub use state::{far_for_side, is_tracked, side_of_layer, INSIDE, INSIDE_FAR, OUTSIDE, OUTSIDE_FAR};
pub use voxel::Voxel;
