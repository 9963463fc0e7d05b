//! Narrow-band element arena and layer bookkeeping for the limn toolkit.
//!
//! The band is modelled as an index-based arena: [`BandElement`] records
//! live in a flat slot vector inside [`BandArena`], and both the layer
//! lists ([`LayerSet`]) and the engine's coordinate lookup table refer to
//! them by [`ElementIdx`]. Recycling is a free-list push/pop over indices,
//! so the hot per-iteration paths never allocate once the band has reached
//! its working size.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod element;
pub mod layers;

pub use arena::BandArena;
pub use element::{BandElement, ElementIdx, UNQUEUED};
pub use layers::LayerSet;
