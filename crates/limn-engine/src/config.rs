//! Engine configuration, validation, and error types.
//!
//! [`EvolveConfig`] carries every tunable of the evolution equation. It is
//! consumed at engine construction; there are no post-construction setters,
//! so a running engine's parameters cannot drift mid-evolution.

use std::error::Error;
use std::fmt;

use limn_grid::VolumeDims;

/// Where the reference seed intensity is derived from when the seed map
/// does not carry an explicit value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeedSource {
    /// Mean intensity over the ZERO-classified voxels.
    #[default]
    Zero,
    /// Mean intensity over the INSIDE-classified voxels.
    Inside,
}

/// Tunables for the sparse-field evolution.
///
/// The defaults reproduce the stock parameterization: advection 2.2,
/// curvature 1.0, convergence weight 0.005, derived time step
/// `1/6 · 1/(curvature · advection)`, band half-width 2, and an intensity
/// noise floor of 30 units below which the image term ignores deviation
/// from the seed intensity.
#[derive(Clone, Debug)]
pub struct EvolveConfig {
    /// Weight of the advection force expanding the contour along surface
    /// normals.
    pub advection_weight: f64,
    /// Weight of the regulatory curvature term.
    pub curvature_weight: f64,
    /// Mean-change-per-voxel threshold factor for convergence, relative to
    /// the time step.
    pub convergence_weight: f64,
    /// Explicit time step for the numerical solution; `None` derives it
    /// from the two force weights.
    pub time_step: Option<f64>,
    /// Number of tracked rings on each side of the zero layer.
    pub band_half_width: u32,
    /// Intensity distances from the seed value below this floor do not
    /// penalize the image term.
    pub intensity_noise_floor: f64,
    /// Population the seed intensity is derived from when unset.
    pub seed_source: SeedSource,
}

impl Default for EvolveConfig {
    fn default() -> Self {
        Self {
            advection_weight: 2.2,
            curvature_weight: 1.0,
            convergence_weight: 0.005,
            time_step: None,
            band_half_width: 2,
            intensity_noise_floor: 30.0,
            seed_source: SeedSource::Zero,
        }
    }
}

impl EvolveConfig {
    /// Largest accepted band half-width. The state dump encodes the far
    /// sentinels as ±9, so layer indices must stay below that.
    pub const MAX_HALF_WIDTH: u32 = 8;

    /// Check every tunable for validity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("advection_weight", self.advection_weight),
            ("curvature_weight", self.curvature_weight),
            ("convergence_weight", self.convergence_weight),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveWeight { name, value });
            }
        }
        if let Some(dt) = self.time_step {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(ConfigError::InvalidTimeStep { value: dt });
            }
        }
        if self.band_half_width == 0 || self.band_half_width > Self::MAX_HALF_WIDTH {
            return Err(ConfigError::BandHalfWidthOutOfRange {
                value: self.band_half_width,
                max: Self::MAX_HALF_WIDTH,
            });
        }
        if !self.intensity_noise_floor.is_finite() || self.intensity_noise_floor < 0.0 {
            return Err(ConfigError::InvalidNoiseFloor {
                value: self.intensity_noise_floor,
            });
        }
        Ok(())
    }

    /// The effective time step: the explicit value, or
    /// `1/6 · 1/(curvature_weight · advection_weight)`.
    pub fn resolved_time_step(&self) -> f64 {
        self.time_step
            .unwrap_or(1.0 / 6.0 / (self.curvature_weight * self.advection_weight))
    }
}

/// Errors detected while constructing a
/// [`SparseFieldEngine`](crate::SparseFieldEngine).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// A force or convergence weight is not a positive finite number.
    NonPositiveWeight {
        /// Which weight was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The explicit time step is not a positive finite number.
    InvalidTimeStep {
        /// The rejected value.
        value: f64,
    },
    /// The band half-width is zero or too large.
    BandHalfWidthOutOfRange {
        /// The rejected value.
        value: u32,
        /// The largest accepted half-width.
        max: u32,
    },
    /// The intensity noise floor is negative or non-finite.
    InvalidNoiseFloor {
        /// The rejected value.
        value: f64,
    },
    /// Image and seed classification cover different volumes.
    DimsMismatch {
        /// Extent reported by the image.
        image: VolumeDims,
        /// Extent covered by the seed classification.
        seed: VolumeDims,
    },
    /// The image's slice-spacing ratio is not a positive finite number.
    InvalidZScale {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveWeight { name, value } => {
                write!(f, "{name} must be positive and finite, got {value}")
            }
            Self::InvalidTimeStep { value } => {
                write!(f, "time step must be positive and finite, got {value}")
            }
            Self::BandHalfWidthOutOfRange { value, max } => {
                write!(f, "band half-width {value} outside 1..={max}")
            }
            Self::InvalidNoiseFloor { value } => {
                write!(f, "intensity noise floor must be non-negative, got {value}")
            }
            Self::DimsMismatch { image, seed } => {
                write!(f, "image covers {image:?} but seed covers {seed:?}")
            }
            Self::InvalidZScale { value } => {
                write!(f, "z-scale must be positive and finite, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}
