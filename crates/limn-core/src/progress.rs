//! The optional per-iteration progress observer.

use crate::voxel::Voxel;

/// Coordinates of one tracked layer, for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerCoords {
    /// Signed layer offset from the contour (0 is the zero layer).
    pub layer: i32,
    /// The voxels currently in that layer.
    pub voxels: Vec<Voxel>,
}

/// Lightweight snapshot of one evolution iteration.
///
/// Carries just enough for a renderer or logger: no image data, no phi
/// values, only the tracked-layer coordinates and the mean-change metric.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEvent {
    /// Iteration count so far; 0 for the post-initialization event.
    pub iteration: u64,
    /// Mean absolute phi change per evaluated zero-layer voxel.
    pub mean_change: f64,
    /// Tracked layers in layer order, `-K` first.
    pub layers: Vec<LayerCoords>,
}

/// Observer notified once per evolution iteration (and once right after
/// initialization).
///
/// Purely informational: implementations must not assume they can influence
/// the evolution, and the engine runs identically with or without a sink
/// attached.
pub trait ProgressSink {
    /// Receive one iteration's event.
    fn on_iteration(&mut self, event: &ProgressEvent);
}
