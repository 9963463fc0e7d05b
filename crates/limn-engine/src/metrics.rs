//! Per-iteration evolution metrics.

/// Figures collected during the most recent iteration, plus running
/// counters. The controller refreshes these after every iteration; they
/// survive engine termination so post-mortem inspection still works.
#[derive(Clone, Debug, Default)]
pub struct EvolveMetrics {
    /// Iterations executed so far.
    pub iterations: u64,
    /// Sum of absolute phi change over the last active-layer pass.
    pub total_change: f64,
    /// Zero-layer voxels evaluated in the last pass.
    pub updated_voxels: usize,
    /// `total_change / updated_voxels` for the last pass (0 when the zero
    /// layer was empty).
    pub mean_change: f64,
    /// Layer sizes after the last iteration, `-K` first.
    pub layer_sizes: Vec<usize>,
    /// Band elements alive after the last iteration.
    pub band_elements: usize,
}

impl EvolveMetrics {
    pub(crate) fn record_iteration(
        &mut self,
        total_change: f64,
        updated_voxels: usize,
        layer_sizes: Vec<usize>,
        band_elements: usize,
    ) {
        self.iterations += 1;
        self.total_change = total_change;
        self.updated_voxels = updated_voxels;
        self.mean_change = if updated_voxels > 0 {
            total_change / updated_voxels as f64
        } else {
            0.0
        };
        self.layer_sizes = layer_sizes;
        self.band_elements = band_elements;
    }
}
