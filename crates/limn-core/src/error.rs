//! Terminal evolution failures.

use std::error::Error;
use std::fmt;

/// Reasons the evolution engine can enter its terminal `Invalid` phase.
///
/// Neither failure is recoverable on the same engine instance: the caller's
/// remedy is a fresh engine with different seeding or parameters. Ordinary
/// control flow never raises these as exceptions; they are surfaced through
/// the engine's phase and the snapshot accessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvolveError {
    /// The seed classification contained no ZERO and no INSIDE voxels, so
    /// there is no starting contour to evolve.
    InvalidSeed,
    /// The accumulated per-iteration change became non-numeric. This
    /// signals the discretization went unstable, typically because the
    /// contour expanded without bound.
    NumericalInstability,
}

impl fmt::Display for EvolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSeed => write!(f, "seed classification has no inside or zero voxels"),
            Self::NumericalInstability => {
                write!(f, "numerical instability: total change became NaN")
            }
        }
    }
}

impl Error for EvolveError {}
