//! The [`ImageVolume`] collaborator trait.

use crate::dims::VolumeDims;
use limn_core::Voxel;

/// Read access to the source image the contour evolves over.
///
/// Acquisition, decoding, filtering, and gradient computation are upstream
/// concerns; the engine only ever consumes the finished products through
/// this trait. Implementations must be consistent for the lifetime of an
/// engine: the same voxel always yields the same intensity.
///
/// # Contract
///
/// - `intensity` is only called with coordinates inside `dims()`.
/// - `z_scale` is the slice-spacing to pixel-spacing ratio and must be a
///   positive finite number; the engine's constructor rejects anything else.
/// - `gradient_magnitudes` returns one value per voxel in canonical order
///   (x fastest, then y, then z). It is called exactly once, at engine
///   initialization, mirroring the one-shot gradient precomputation of the
///   surrounding segmentation pipeline.
pub trait ImageVolume {
    /// The volume extent.
    fn dims(&self) -> VolumeDims;

    /// Intensity of the voxel at `v`.
    fn intensity(&self, v: Voxel) -> f64;

    /// Slice-spacing to pixel-spacing ratio for anisotropic volumes.
    fn z_scale(&self) -> f64;

    /// The precomputed gradient-magnitude volume, canonical order.
    fn gradient_magnitudes(&self) -> Vec<f64>;
}

impl<V: ImageVolume + ?Sized> ImageVolume for &V {
    fn dims(&self) -> VolumeDims {
        (**self).dims()
    }

    fn intensity(&self, v: Voxel) -> f64 {
        (**self).intensity(v)
    }

    fn z_scale(&self) -> f64 {
        (**self).z_scale()
    }

    fn gradient_magnitudes(&self) -> Vec<f64> {
        (**self).gradient_magnitudes()
    }
}

impl<V: ImageVolume + ?Sized> ImageVolume for Box<V> {
    fn dims(&self) -> VolumeDims {
        (**self).dims()
    }

    fn intensity(&self, v: Voxel) -> f64 {
        (**self).intensity(v)
    }

    fn z_scale(&self) -> f64 {
        (**self).z_scale()
    }

    fn gradient_magnitudes(&self) -> Vec<f64> {
        (**self).gradient_magnitudes()
    }
}
