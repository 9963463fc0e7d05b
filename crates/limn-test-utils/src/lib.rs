//! Test fixtures and synthetic volumes for limn development.
//!
//! Provides [`ImageVolume`] implementations with known analytic structure
//! (uniform, bright ball, seeded noise), seed-map builders, and a
//! [`CollectingSink`] that records progress events.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use limn_core::{ProgressEvent, ProgressSink, Voxel};
use limn_grid::{ImageVolume, SeedLabel, SeedMap, VolumeDims};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Uniform intensity everywhere; zero gradient magnitude.
///
/// With the seed intensity matching, the image term is exactly 1 and the
/// contour expands freely — the fixture for isotropic-growth and
/// convergence tests.
pub struct FlatVolume {
    dims: VolumeDims,
    intensity: f64,
    z_scale: f64,
}

impl FlatVolume {
    pub fn new(dims: VolumeDims, intensity: f64) -> Self {
        Self {
            dims,
            intensity,
            z_scale: 1.0,
        }
    }

    pub fn with_z_scale(mut self, z_scale: f64) -> Self {
        self.z_scale = z_scale;
        self
    }
}

impl ImageVolume for FlatVolume {
    fn dims(&self) -> VolumeDims {
        self.dims
    }

    fn intensity(&self, _v: Voxel) -> f64 {
        self.intensity
    }

    fn z_scale(&self) -> f64 {
        self.z_scale
    }

    fn gradient_magnitudes(&self) -> Vec<f64> {
        vec![0.0; self.dims.cell_count()]
    }
}

/// A bright ball on a dark background, with a gradient shell at the
/// ball surface. The fixture for boundary-stopping tests.
pub struct BallVolume {
    dims: VolumeDims,
    center: Voxel,
    radius: f64,
    inner: f64,
    outer: f64,
}

impl BallVolume {
    pub fn new(dims: VolumeDims, center: Voxel, radius: f64, inner: f64, outer: f64) -> Self {
        Self {
            dims,
            center,
            radius,
            inner,
            outer,
        }
    }
}

impl ImageVolume for BallVolume {
    fn dims(&self) -> VolumeDims {
        self.dims
    }

    fn intensity(&self, v: Voxel) -> f64 {
        let dx = f64::from(v.x - self.center.x);
        let dy = f64::from(v.y - self.center.y);
        let dz = f64::from(v.z - self.center.z);
        if (dx * dx + dy * dy + dz * dz).sqrt() <= self.radius {
            self.inner
        } else {
            self.outer
        }
    }

    fn z_scale(&self) -> f64 {
        1.0
    }

    fn gradient_magnitudes(&self) -> Vec<f64> {
        central_gradient_magnitudes(self)
    }
}

/// Uniform base intensity plus deterministic seeded noise.
pub struct NoiseVolume {
    dims: VolumeDims,
    samples: Vec<f64>,
    z_scale: f64,
}

impl NoiseVolume {
    pub fn new(dims: VolumeDims, base: f64, amplitude: f64, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let samples = (0..dims.cell_count())
            .map(|_| base + (rng.random::<f64>() * 2.0 - 1.0) * amplitude)
            .collect();
        Self {
            dims,
            samples,
            z_scale: 1.0,
        }
    }
}

impl ImageVolume for NoiseVolume {
    fn dims(&self) -> VolumeDims {
        self.dims
    }

    fn intensity(&self, v: Voxel) -> f64 {
        self.samples[self.dims.flat_index(v)]
    }

    fn z_scale(&self) -> f64 {
        self.z_scale
    }

    fn gradient_magnitudes(&self) -> Vec<f64> {
        central_gradient_magnitudes(self)
    }
}

/// Central-difference gradient magnitude of any volume, one value per
/// voxel in canonical order. Missing neighbours at the border reuse the
/// centre sample, matching the usual one-shot precomputation upstream of
/// the engine.
pub fn central_gradient_magnitudes<V: ImageVolume>(volume: &V) -> Vec<f64> {
    let dims = volume.dims();
    let sample = |v: Voxel, fallback: Voxel| {
        if dims.contains(v) {
            volume.intensity(v)
        } else {
            volume.intensity(fallback)
        }
    };
    dims.voxels()
        .map(|v| {
            let gx = (sample(v.offset(1, 0, 0), v) - sample(v.offset(-1, 0, 0), v)) / 2.0;
            let gy = (sample(v.offset(0, 1, 0), v) - sample(v.offset(0, -1, 0), v)) / 2.0;
            let gz = (sample(v.offset(0, 0, 1), v) - sample(v.offset(0, 0, -1), v)) / 2.0;
            (gx * gx + gy * gy + gz * gz).sqrt()
        })
        .collect()
}

/// A classification with a single ZERO voxel at `center`, everything else
/// OUTSIDE.
pub fn point_seed(dims: VolumeDims, center: Voxel) -> SeedMap {
    let mut seed = SeedMap::new(dims);
    seed.set_label(center, SeedLabel::Zero);
    seed
}

/// A classification with a euclidean ball: INSIDE within `radius`, a
/// one-voxel ZERO shell at the surface, OUTSIDE beyond.
pub fn ball_seed(dims: VolumeDims, center: Voxel, radius: f64) -> SeedMap {
    let mut seed = SeedMap::new(dims);
    for v in dims.voxels() {
        let dx = f64::from(v.x - center.x);
        let dy = f64::from(v.y - center.y);
        let dz = f64::from(v.z - center.z);
        let dist = (dx * dx + dy * dy + dz * dz).sqrt();
        if dist < radius {
            seed.set_label(v, SeedLabel::Inside);
        } else if dist < radius + 1.0 {
            seed.set_label(v, SeedLabel::Zero);
        }
    }
    seed
}

/// Records every progress event it receives.
#[derive(Default)]
pub struct CollectingSink {
    pub events: Vec<ProgressEvent>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for CollectingSink {
    fn on_iteration(&mut self, event: &ProgressEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_volume_has_zero_gradients() {
        let dims = VolumeDims::new(4, 4, 4).unwrap();
        let v = FlatVolume::new(dims, 50.0);
        assert!(v.gradient_magnitudes().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn ball_volume_gradient_peaks_at_surface() {
        let dims = VolumeDims::new(9, 9, 9).unwrap();
        let v = BallVolume::new(dims, Voxel::new(4, 4, 4), 2.5, 200.0, 0.0);
        let grads = v.gradient_magnitudes();
        let center = dims.flat_index(Voxel::new(4, 4, 4));
        let surface = dims.flat_index(Voxel::new(4, 4, 6));
        let far = dims.flat_index(Voxel::new(0, 0, 0));
        assert_eq!(grads[center], 0.0);
        assert!(grads[surface] > 0.0);
        assert_eq!(grads[far], 0.0);
    }

    #[test]
    fn noise_volume_is_deterministic_per_seed() {
        let dims = VolumeDims::new(4, 4, 4).unwrap();
        let a = NoiseVolume::new(dims, 100.0, 5.0, 7);
        let b = NoiseVolume::new(dims, 100.0, 5.0, 7);
        let c = NoiseVolume::new(dims, 100.0, 5.0, 8);
        let v = Voxel::new(1, 2, 3);
        assert_eq!(a.intensity(v), b.intensity(v));
        assert_ne!(a.intensity(v), c.intensity(v));
    }

    #[test]
    fn ball_seed_layers_nest() {
        let dims = VolumeDims::new(11, 11, 11).unwrap();
        let seed = ball_seed(dims, Voxel::new(5, 5, 5), 3.0);
        assert_eq!(seed.label(Voxel::new(5, 5, 5)), SeedLabel::Inside);
        assert_eq!(seed.label(Voxel::new(5, 5, 8)), SeedLabel::Zero);
        assert_eq!(seed.label(Voxel::new(0, 0, 0)), SeedLabel::Outside);
    }
}
