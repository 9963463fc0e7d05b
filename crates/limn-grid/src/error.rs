//! Volume geometry errors.

use std::error::Error;
use std::fmt;

/// Errors from [`VolumeDims`](crate::VolumeDims) construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridError {
    /// One of the dimensions is zero.
    EmptyVolume,
    /// A dimension exceeds the maximum addressable extent.
    DimensionTooLarge {
        /// Name of the offending axis.
        axis: &'static str,
        /// The rejected value.
        value: u32,
        /// The maximum allowed value.
        max: u32,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyVolume => write!(f, "volume has zero cells"),
            Self::DimensionTooLarge { axis, value, max } => {
                write!(f, "{axis} = {value} exceeds maximum {max}")
            }
        }
    }
}

impl Error for GridError {}
